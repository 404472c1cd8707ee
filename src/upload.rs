//! Guarded CSV import flow.
//!
//! [`UploadController`] owns the single pending file and the single
//! in-flight upload. It validates a file on selection, re-checks it and
//! sniffs its header on submit, runs a simulated progress estimate while the
//! request is out, and records the outcome.

mod progress;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::{FintrackError, Result};
use crate::file::SelectedFile;
use crate::models::ImportSummary;
use crate::sniff::ContentSniffer;
use crate::validation::FileValidator;

use self::progress::ProgressTicker;
pub use self::progress::{Progress, ProgressPhase, ProgressSettings};

/// Message recorded when a submit is dropped before the server answers.
const CANCELLED_MESSAGE: &str = "Upload cancelled";

/// Sends a CSV file to the import endpoint.
///
/// Implemented by [`crate::client::FinTrackClient`]; tests substitute their
/// own transport.
pub trait ImportTransport: core::fmt::Debug + Send + Sync {
    /// Uploads `file` and returns the backend's import summary.
    ///
    /// # Errors
    ///
    /// Returns the transport or server error unchanged.
    fn upload(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<ImportSummary>> + Send;
}

impl<T: ImportTransport> ImportTransport for &T {
    #[inline]
    fn upload(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<ImportSummary>> + Send {
        (**self).upload(file)
    }
}

/// How a finished upload ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The backend imported the file.
    Success(ImportSummary),
    /// The upload failed; holds the message to show the user.
    Failure(String),
}

/// Where the controller is in the import flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Nothing selected.
    Idle,
    /// A valid file is waiting to be submitted.
    FileSelected {
        /// Why the last submit was refused before sending, if it was.
        error: Option<String>,
    },
    /// Re-checking the file before upload.
    Validating,
    /// The request is in flight.
    Uploading,
    /// The request finished.
    Completed(UploadOutcome),
}

impl UploadState {
    /// Short lowercase name of the state.
    #[inline]
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match *self {
            Self::Idle => "idle",
            Self::FileSelected { .. } => "file selected",
            Self::Validating => "validating",
            Self::Uploading => "uploading",
            Self::Completed(_) => "completed",
        }
    }

    /// Returns `true` while a submit is running.
    #[inline]
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(*self, Self::Validating | Self::Uploading)
    }
}

/// Mutable controller state, guarded by one mutex.
#[derive(Debug)]
struct Inner {
    /// Current flow state.
    state: UploadState,
    /// The pending or last-sent file; `None` only when idle.
    file: Option<SelectedFile>,
    /// Progress timer for the in-flight upload.
    ticker: Option<ProgressTicker>,
}

/// Owns the import flow for one file at a time.
///
/// All methods take `&self`; the state lock is never held across an
/// `.await`, so the controller can be shared between tasks.
#[derive(Debug)]
pub struct UploadController<T> {
    /// Sends the file.
    transport: T,
    /// Metadata checks.
    validator: FileValidator,
    /// Header checks.
    sniffer: ContentSniffer,
    /// Shape of the progress estimate.
    settings: ProgressSettings,
    /// Flow state.
    inner: Mutex<Inner>,
    /// Latest progress estimate.
    progress: Arc<watch::Sender<Progress>>,
}

impl<T: ImportTransport> UploadController<T> {
    /// Creates an idle controller with default limits.
    #[inline]
    #[must_use]
    pub fn new(transport: T) -> Self {
        let validator = FileValidator::default();
        let sniffer = ContentSniffer::new(validator.limits().sniff_limit);
        Self {
            transport,
            validator,
            sniffer,
            settings: ProgressSettings::default(),
            inner: Mutex::new(Inner {
                state: UploadState::Idle,
                file: None,
                ticker: None,
            }),
            progress: Arc::new(watch::Sender::new(Progress::default())),
        }
    }

    /// Replaces the metadata validator. The sniffer adopts the validator's
    /// [`ImportLimits::sniff_limit`](crate::validation::ImportLimits::sniff_limit).
    #[inline]
    #[must_use]
    pub fn validator(mut self, validator: FileValidator) -> Self {
        self.sniffer = self.sniffer.with_limit(validator.limits().sniff_limit);
        self.validator = validator;
        self
    }

    /// Replaces the header sniffer.
    #[inline]
    #[must_use]
    pub fn sniffer(mut self, sniffer: ContentSniffer) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Replaces the progress estimate settings.
    #[inline]
    #[must_use]
    pub fn progress_settings(mut self, settings: ProgressSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the transport.
    #[inline]
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a snapshot of the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> UploadState {
        self.lock().state.clone()
    }

    /// Returns the pending or last-sent file.
    #[inline]
    #[must_use]
    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.lock().file.clone()
    }

    /// Subscribes to the simulated progress estimate.
    #[inline]
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Validates and stores `file` as the pending selection.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::UploadInProgress`] while a submit is running,
    /// or [`FintrackError::Validation`] if the file is rejected. Either way
    /// the current state is left untouched.
    #[inline]
    #[tracing::instrument(skip_all, fields(name = %file.name(), size = file.size_bytes()))]
    pub fn select_file(&self, file: SelectedFile) -> Result<()> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            tracing::warn!(state = inner.state.label(), "selection rejected");
            return Err(FintrackError::UploadInProgress);
        }
        self.validator.validate(&file).into_result()?;

        tracing::debug!("file selected");
        inner.ticker = None;
        inner.file = Some(file);
        inner.state = UploadState::FileSelected { error: None };
        _ = self.progress.send_replace(Progress::default());
        Ok(())
    }

    /// Drops the selection and returns to [`UploadState::Idle`].
    ///
    /// Calling it when already idle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::UploadInProgress`] while a submit is running.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn clear_selection(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            tracing::warn!(state = inner.state.label(), "clear rejected");
            return Err(FintrackError::UploadInProgress);
        }
        inner.ticker = None;
        inner.file = None;
        inner.state = UploadState::Idle;
        _ = self.progress.send_replace(Progress::default());
        Ok(())
    }

    /// Starts over after a finished import. Same as [`Self::clear_selection`].
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::UploadInProgress`] while a submit is running.
    #[inline]
    pub fn reset(&self) -> Result<()> {
        self.clear_selection()
    }

    /// Re-checks the pending file and uploads it.
    ///
    /// The file's size is read again before the checks, so a file that
    /// changed on disk since selection is judged as it is now. On a failed
    /// pre-check the controller returns to [`UploadState::FileSelected`]
    /// with the error recorded and nothing is sent. Otherwise exactly one
    /// request is issued and the state ends in [`UploadState::Completed`].
    ///
    /// # Errors
    ///
    /// - [`FintrackError::UploadInProgress`] if a submit is already running.
    /// - [`FintrackError::NoFileSelected`] when idle.
    /// - [`FintrackError::InvalidState`] after completion (reset first).
    /// - [`FintrackError::Validation`] if the pre-check fails.
    /// - The transport's error if the upload fails.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub async fn submit(&self) -> Result<ImportSummary> {
        let mut attempt = self.begin_validation()?;

        let checked = self.preflight(&attempt.file).await;
        match checked {
            Ok(current) => attempt.file = current,
            Err(err) => {
                tracing::warn!(error = %err, "pre-upload check failed");
                attempt.reject(err.user_message());
                return Err(err);
            }
        }

        self.begin_upload();
        let (outcome, result) = match self.transport.upload(&attempt.file).await {
            Ok(summary) => {
                tracing::debug!(
                    imported = summary.imported,
                    duplicates = summary.duplicates,
                    "import finished"
                );
                (UploadOutcome::Success(summary.clone()), Ok(summary))
            }
            Err(err) => {
                tracing::warn!(error = %err, "import failed");
                (UploadOutcome::Failure(err.user_message()), Err(err))
            }
        };
        attempt.finish(outcome);
        result
    }

    /// Moves `FileSelected` to `Validating` and hands out the attempt.
    fn begin_validation(&self) -> Result<Attempt<'_>> {
        let mut inner = self.lock();
        match inner.state {
            UploadState::FileSelected { .. } => {}
            UploadState::Validating | UploadState::Uploading => {
                tracing::warn!("submit rejected: upload in progress");
                return Err(FintrackError::UploadInProgress);
            }
            UploadState::Idle => return Err(FintrackError::NoFileSelected),
            UploadState::Completed(_) => {
                return Err(FintrackError::InvalidState {
                    action: "submit",
                    state: inner.state.label(),
                });
            }
        }
        let file = inner.file.clone().ok_or(FintrackError::NoFileSelected)?;
        inner.state = UploadState::Validating;
        Ok(Attempt {
            inner: &self.inner,
            progress: &self.progress,
            file,
            settled: false,
        })
    }

    /// Refreshes the file's metadata and runs the metadata and header
    /// checks on the blocking pool. Returns the refreshed file.
    async fn preflight(&self, file: &SelectedFile) -> Result<SelectedFile> {
        let current = file.clone();
        let validator = self.validator.clone();
        let sniffer = self.sniffer.clone();
        tokio::task::spawn_blocking(move || -> Result<SelectedFile> {
            let refreshed = current.refreshed()?;
            validator.validate(&refreshed).into_result()?;
            let header = sniffer.sniff_file(&refreshed)?;
            tracing::debug!(columns = header.columns.len(), rows = header.data_rows, "header accepted");
            Ok(refreshed)
        })
        .await
        .map_err(|err| FintrackError::Io(std::io::Error::other(err)))?
    }

    /// Moves to `Uploading` and starts the progress estimate.
    fn begin_upload(&self) {
        let mut inner = self.lock();
        inner.state = UploadState::Uploading;
        _ = self.progress.send_replace(Progress::default());
        inner.ticker = Some(ProgressTicker::start(Arc::clone(&self.progress), self.settings));
    }

    /// Locks the state, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One submit between leaving `FileSelected` and settling. If the submit
/// future is dropped first, the file goes back to `FileSelected`.
#[derive(Debug)]
struct Attempt<'c> {
    /// Controller state.
    inner: &'c Mutex<Inner>,
    /// Controller progress channel.
    progress: &'c watch::Sender<Progress>,
    /// The file being checked or sent.
    file: SelectedFile,
    /// Set once the state has been settled.
    settled: bool,
}

impl Attempt<'_> {
    /// Returns to `FileSelected` with the pre-check failure.
    fn reject(mut self, message: String) {
        self.settle(UploadState::FileSelected { error: Some(message) }, Progress::default());
    }

    /// Stops the estimate, shows 100 % and records the outcome.
    fn finish(mut self, outcome: UploadOutcome) {
        self.settle(UploadState::Completed(outcome), Progress::complete());
    }

    /// Writes the final state and progress reading, stopping the ticker.
    fn settle(&mut self, state: UploadState, reading: Progress) {
        self.settled = true;
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.ticker = None;
        inner.state = state;
        drop(inner);
        _ = self.progress.send_replace(reading);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(
                UploadState::FileSelected {
                    error: Some(CANCELLED_MESSAGE.to_owned()),
                },
                Progress::default(),
            );
        }
    }
}
