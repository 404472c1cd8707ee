//! Client-side checks on a selected file's metadata.
//!
//! Nothing here reads file contents; see [`crate::sniff`] for the header
//! check.

use crate::file::SelectedFile;

/// Default upper bound on import size: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Longest file name the backend accepts.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// MIME types browsers report for CSV files.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "text/csv",
    "application/vnd.ms-excel",
    "text/plain",
    "application/csv",
];

/// Substrings that make a file name unsafe to send.
const UNSAFE_NAME_PATTERNS: &[&str] = &["<", ">", ":", "\"", "|", "?", "*", "\0", ".."];

/// Reasons a file is rejected before upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The name does not end in `.csv`.
    #[error("Please select a CSV file")]
    InvalidExtension,

    /// The declared MIME type is not one of the accepted CSV types.
    #[error("Invalid file type. Please select a CSV file")]
    InvalidMimeType,

    /// The file has zero bytes.
    #[error("File is empty")]
    EmptyFile,

    /// The file exceeds the size ceiling.
    #[error("File too large. Maximum size is {}", size_label(.max))]
    FileTooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed maximum in bytes.
        max: u64,
    },

    /// The name contains path traversal or reserved characters.
    #[error("Invalid filename")]
    UnsafeFileName,

    /// The name is longer than the backend accepts.
    #[error("Filename too long")]
    FileNameTooLong,

    /// The content contains NUL bytes.
    #[error("File appears to be binary, not CSV")]
    BinaryContent,

    /// Fewer than two non-blank lines.
    #[error("CSV has no data rows")]
    NoDataRows,

    /// Required logical columns could not be matched in the header.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The file could not be read for inspection.
    #[error("Could not read file: {0}")]
    Unreadable(String),
}

/// Tunable limits for import validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLimits {
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// How many leading bytes the content sniffer inspects. An
    /// [`UploadController`](crate::upload::UploadController) given this
    /// validator sizes its sniffer from it.
    pub sniff_limit: usize,
    /// Accepted MIME types. An absent type is always accepted.
    pub allowed_mime_types: Vec<String>,
}

impl Default for ImportLimits {
    #[inline]
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            sniff_limit: crate::sniff::SNIFF_LIMIT,
            allowed_mime_types: ALLOWED_MIME_TYPES
                .iter()
                .map(|&mime| mime.to_owned())
                .collect(),
        }
    }
}

/// Outcome of [`FileValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// First failing check, if any.
    error: Option<ValidationError>,
}

impl ValidationResult {
    /// Returns `true` when every check passed.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the message describing the first failure.
    #[inline]
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Returns the first failure, if any.
    #[inline]
    #[must_use]
    pub const fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    #[inline]
    pub fn into_result(self) -> Result<(), ValidationError> {
        self.error.map_or(Ok(()), Err)
    }
}

/// Checks file metadata against [`ImportLimits`].
#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    /// Active limits.
    limits: ImportLimits,
}

impl FileValidator {
    /// Creates a validator with custom limits.
    #[inline]
    #[must_use]
    pub const fn new(limits: ImportLimits) -> Self {
        Self { limits }
    }

    /// Returns the active limits.
    #[inline]
    #[must_use]
    pub const fn limits(&self) -> &ImportLimits {
        &self.limits
    }

    /// Runs every check on raw metadata and stops at the first failure.
    ///
    /// Order: extension, MIME type, empty, size, unsafe name, name length.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    #[inline]
    pub fn check(
        &self,
        name: &str,
        size_bytes: u64,
        mime_type: Option<&str>,
    ) -> Result<(), ValidationError> {
        if !has_csv_extension(name) {
            return Err(ValidationError::InvalidExtension);
        }
        if let Some(mime) = mime_type.filter(|mime| !mime.is_empty())
            && !self.limits.allowed_mime_types.iter().any(|allowed| allowed == mime)
        {
            return Err(ValidationError::InvalidMimeType);
        }
        if size_bytes == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size_bytes > self.limits.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: size_bytes,
                max: self.limits.max_file_size,
            });
        }
        if UNSAFE_NAME_PATTERNS
            .iter()
            .any(|&pattern| name.contains(pattern))
        {
            return Err(ValidationError::UnsafeFileName);
        }
        if name.len() > MAX_FILE_NAME_LEN {
            return Err(ValidationError::FileNameTooLong);
        }
        Ok(())
    }

    /// Validates a selected file.
    #[inline]
    #[must_use]
    pub fn validate(&self, file: &SelectedFile) -> ValidationResult {
        let result = self.check(file.name(), file.size_bytes(), file.mime_type());
        if let Err(err) = result.as_ref() {
            tracing::debug!(name = file.name(), error = %err, "file rejected");
        }
        ValidationResult {
            error: result.err(),
        }
    }
}

/// Returns `true` if `name` ends in `.csv`, ignoring case.
fn has_csv_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

/// Formats a byte limit for error messages.
fn size_label(bytes: &u64) -> String {
    crate::present::format_file_size(*bytes)
}
