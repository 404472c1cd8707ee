//! Data models for FinTrack backend entities.
//!
//! Everything here mirrors the JSON the backend sends or accepts. Field
//! names follow the backend's snake_case columns; identifiers are wrapped
//! in integer newtypes.

mod account;
mod auth;
mod dashboard;
mod ids;
mod import;
mod report;
mod transaction;
mod weekly;

pub use account::{Account, AccountUpdate, DeleteAccountRequest, NewAccount};
pub use auth::{ApiMessage, AuthStatus, LoginRequest, RegisterRequest, UserProfile};
pub use chrono::{NaiveDate, NaiveDateTime};
pub use dashboard::{DashboardAccount, DashboardResponse, DashboardStatistics};
pub use ids::{AccountId, CategoryId, ReportId, TransactionId, UserId};
pub use import::{ErrorDetail, ImportSummary};
pub use report::{GenerateReportRequest, ParseMonthError, ReportList, ReportMonth, ReportRecord};
pub use transaction::TransactionRecord;
pub use weekly::{DateRange, WeekBucket, WeeklyChartResponse, WeeklySummary};
