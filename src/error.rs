//! Error types for the FinTrack client library.

use crate::validation::ValidationError;

/// Fallback message shown when the backend could not be reached.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please try again.";

/// Fallback message shown when the backend rejected a request without
/// explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Import failed";

/// All errors that can occur when using the FinTrack client.
#[derive(Debug, thiserror::Error)]
pub enum FintrackError {
    /// A selected file failed client-side validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A form failed client-side validation before any request was sent.
    #[error("invalid form: {}", .0.join("; "))]
    InvalidForm(Vec<String>),

    /// HTTP transport failed (connection refused, TLS, body decode).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned a non-success status without a `detail` body.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// The server rejected the request and explained why in `detail`.
    #[error("{detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail reported by the server.
        detail: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An upload is already running; the request was not sent.
    #[error("an upload is already in progress")]
    UploadInProgress,

    /// An upload was requested with nothing selected.
    #[error("no file selected")]
    NoFileSelected,

    /// The upload controller cannot perform the action in its current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        /// Attempted action.
        action: &'static str,
        /// Current controller state label.
        state: &'static str,
    },
}

/// Coarse classification of a [`FintrackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected locally before any request was issued.
    Validation,
    /// The request never produced a usable server answer, or the server
    /// answered with a non-success status and no `detail`.
    Transport,
    /// The server answered and reported a failure.
    Server,
}

impl FintrackError {
    /// Classifies the error as a validation, transport, or server failure.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match *self {
            Self::Validation(_)
            | Self::InvalidForm(_)
            | Self::InvalidConfig(_)
            | Self::UploadInProgress
            | Self::NoFileSelected
            | Self::InvalidState { .. } => ErrorCategory::Validation,
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Http(_) | Self::Url(_) => ErrorCategory::Transport,
            Self::Serialization(_) | Self::Io(_) | Self::Api { .. } => ErrorCategory::Transport,
            Self::Server { .. } => ErrorCategory::Server,
        }
    }

    /// Returns the message to show the user for this error.
    ///
    /// Server-reported details are passed through verbatim; transport
    /// failures collapse into a generic connection message.
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> String {
        match *self {
            Self::Api { .. } => GENERIC_FAILURE_MESSAGE.to_owned(),
            Self::Server { .. }
            | Self::Validation(_)
            | Self::InvalidForm(_)
            | Self::InvalidConfig(_)
            | Self::UploadInProgress
            | Self::NoFileSelected
            | Self::InvalidState { .. } => self.to_string(),
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Http(_) | Self::Url(_) => CONNECTION_ERROR_MESSAGE.to_owned(),
            Self::Serialization(_) | Self::Io(_) => CONNECTION_ERROR_MESSAGE.to_owned(),
        }
    }
}

/// A specialized `Result` type for FinTrack operations.
pub type Result<T> = core::result::Result<T, FintrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = FintrackError::from(serde_err);
        assert!(matches!(err, FintrackError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = FintrackError::from(ValidationError::EmptyFile);
        assert_eq!(err.to_string(), ValidationError::EmptyFile.to_string());
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn server_detail_is_user_message() {
        let err = FintrackError::Server {
            status: 400,
            detail: "Missing required columns: Amount".to_owned(),
        };
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.user_message(), "Missing required columns: Amount");
        assert_eq!(err.to_string(), "Missing required columns: Amount");
    }

    #[test]
    fn api_error_without_detail_uses_generic_message() {
        let err = FintrackError::Api {
            status: 502,
            message: "<html>bad gateway</html>".to_owned(),
        };
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn invalid_form_joins_issues() {
        let err = FintrackError::InvalidForm(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(err.to_string(), "invalid form: a; b");
    }

    #[test]
    fn invalid_state_display() {
        let err = FintrackError::InvalidState {
            action: "submit",
            state: "idle",
        };
        assert_eq!(err.to_string(), "cannot submit while idle");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FintrackError>();
    }
}
