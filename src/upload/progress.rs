//! Simulated upload progress.
//!
//! The backend reports nothing while an import runs, so progress is an
//! estimate: a timer adds a random step per tick and stalls at a ceiling
//! until the request finishes.

use core::time::Duration;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bound of the estimate once the request has completed.
const COMPLETE_PERCENT: f64 = 100.0;

/// Timing and shape of the simulated progress estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSettings {
    /// Delay between estimate updates.
    pub tick_interval: Duration,
    /// Largest random increment per tick, in percent.
    pub max_step: f64,
    /// Percentage the estimate never exceeds before completion.
    pub ceiling: f64,
}

impl Default for ProgressSettings {
    #[inline]
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            max_step: 15.0,
            ceiling: 90.0,
        }
    }
}

impl ProgressSettings {
    /// Step bound usable as a random range; non-finite or negative values
    /// stop the estimate from moving.
    fn step_bound(&self) -> f64 {
        if self.max_step.is_finite() && self.max_step > 0.0_f64 {
            self.max_step
        } else {
            0.0
        }
    }
}

/// Coarse stage label derived from the estimated percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Below 30 %.
    Uploading,
    /// From 30 % up to 70 %.
    Validating,
    /// 70 % and above.
    Processing,
}

impl ProgressPhase {
    /// Returns the phase for an estimated percentage.
    #[inline]
    #[must_use]
    pub fn for_percent(percent: f64) -> Self {
        if percent < 30.0_f64 {
            Self::Uploading
        } else if percent < 70.0_f64 {
            Self::Validating
        } else {
            Self::Processing
        }
    }

    /// Text shown next to the progress bar.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uploading => "Uploading file...",
            Self::Validating => "Validating data...",
            Self::Processing => "Processing transactions...",
        }
    }
}

/// A simulated progress reading. Not a measurement of bytes sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Estimated completion, `0.0..=100.0`.
    pub percent: f64,
    /// Stage label for `percent`.
    pub phase: ProgressPhase,
}

impl Default for Progress {
    #[inline]
    fn default() -> Self {
        Self::at(0.0)
    }
}

impl Progress {
    /// Reading at `percent`, clamped to `0..=100`.
    #[inline]
    #[must_use]
    pub fn at(percent: f64) -> Self {
        let clamped = percent.clamp(0.0, COMPLETE_PERCENT);
        Self {
            percent: clamped,
            phase: ProgressPhase::for_percent(clamped),
        }
    }

    /// Reading shown once the request has finished.
    #[inline]
    #[must_use]
    pub fn complete() -> Self {
        Self::at(COMPLETE_PERCENT)
    }

    /// Returns `true` once the request has finished.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent >= COMPLETE_PERCENT
    }
}

/// Background task advancing the estimate. Aborted when dropped.
#[derive(Debug)]
pub(super) struct ProgressTicker {
    /// Spawned timer task.
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawns the timer on the current tokio runtime.
    pub(super) fn start(sender: Arc<watch::Sender<Progress>>, settings: ProgressSettings) -> Self {
        let handle = tokio::spawn(tick(sender, settings));
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    #[inline]
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Advances the estimate by a random step every tick until it reaches the
/// ceiling.
async fn tick(sender: Arc<watch::Sender<Progress>>, settings: ProgressSettings) {
    let mut rng = StdRng::from_entropy();
    let bound = settings.step_bound();
    let mut interval = tokio::time::interval(settings.tick_interval);
    // The first tick completes immediately.
    _ = interval.tick().await;
    while sender.borrow().percent < settings.ceiling {
        _ = interval.tick().await;
        let step = rng.gen_range(0.0..=bound);
        sender.send_modify(|progress| {
            let next = (progress.percent + step).min(settings.ceiling);
            *progress = Progress::at(next.max(progress.percent));
        });
        tracing::trace!(percent = sender.borrow().percent, "progress tick");
    }
}
