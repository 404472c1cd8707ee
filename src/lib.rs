//! Client library for the FinTrack personal-finance dashboard.
//!
//! Covers the parts of the dashboard that run on the client:
//!
//! - [`validation`] and [`sniff`]: checks a CSV statement before upload.
//! - [`upload`]: the guarded import flow with a simulated progress estimate.
//! - [`aggregate`]: weekly income/expense buckets.
//! - [`present`]: currency, date and report formatting.
//! - [`credentials`]: login, registration and account form checks.
//! - [`client`]: typed HTTP client for the FinTrack backend.

pub mod aggregate;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod credentials;
pub mod error;
pub mod file;
pub mod models;
pub mod present;
pub mod sniff;
#[cfg(feature = "async")]
pub mod upload;
pub mod validation;
