//! Header sniffing for CSV bank statements.
//!
//! Only a bounded prefix of the file is inspected. The sniffer confirms the
//! content is text, that at least one data row follows the header, and that
//! the header names every required logical column under some spelling
//! ("Value Date", "value_date", "VALUEDATE" and "Booking value-date" all
//! satisfy `Value Date`). Data rows are never parsed here.

use crate::file::SelectedFile;
use crate::validation::ValidationError;

/// Number of leading bytes inspected: 50 KiB.
pub const SNIFF_LIMIT: usize = 50 * 1024;

/// Logical columns every import must carry.
pub const REQUIRED_COLUMNS: &[&str] = &["Value Date", "Text", "Amount"];

/// Characters that may separate header cells.
const DELIMITERS: &[char] = &[',', ';', '\t'];

/// A parsed header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffedHeader {
    /// Header cells, trimmed, unquoted and lowercased, in file order.
    pub columns: Vec<String>,
    /// Number of non-blank lines after the header within the prefix.
    pub data_rows: usize,
}

/// Inspects the head of a CSV file.
#[derive(Debug, Clone)]
pub struct ContentSniffer {
    /// Maximum number of bytes considered.
    limit: usize,
    /// Logical columns the header must name.
    required: Vec<String>,
}

impl Default for ContentSniffer {
    #[inline]
    fn default() -> Self {
        Self::new(SNIFF_LIMIT)
    }
}

impl ContentSniffer {
    /// Creates a sniffer reading at most `limit` bytes and requiring
    /// [`REQUIRED_COLUMNS`].
    #[inline]
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            required: REQUIRED_COLUMNS.iter().map(|&col| col.to_owned()).collect(),
        }
    }

    /// Replaces the required logical columns.
    #[inline]
    #[must_use]
    pub fn with_required<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the byte limit.
    #[inline]
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the byte limit.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Checks the leading bytes of a file.
    ///
    /// Bytes past the configured limit are ignored.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::BinaryContent`] if a NUL character is present.
    /// - [`ValidationError::NoDataRows`] if fewer than two non-blank lines
    ///   remain.
    /// - [`ValidationError::MissingColumns`] listing every required column
    ///   the header does not match.
    #[inline]
    #[tracing::instrument(skip_all, fields(len = prefix.len()))]
    pub fn sniff_header(&self, prefix: &[u8]) -> Result<SniffedHeader, ValidationError> {
        let bounded = prefix.get(..self.limit).unwrap_or(prefix);
        let text = String::from_utf8_lossy(bounded);
        if text.contains('\0') {
            return Err(ValidationError::BinaryContent);
        }

        let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());
        let Some(header_line) = lines.next() else {
            return Err(ValidationError::NoDataRows);
        };
        let data_rows = lines.count();
        if data_rows == 0 {
            return Err(ValidationError::NoDataRows);
        }

        let columns = parse_header(header_line);
        let normalized: Vec<String> = columns.iter().map(|col| normalize(col)).collect();
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|required| !is_matched(&normalize(required), &normalized))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(?missing, "header is missing required columns");
            return Err(ValidationError::MissingColumns(missing));
        }

        tracing::trace!(columns = columns.len(), data_rows, "header accepted");
        Ok(SniffedHeader { columns, data_rows })
    }

    /// Reads the bounded prefix of `file` and checks it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Unreadable`] if the file cannot be read,
    /// otherwise the same errors as [`ContentSniffer::sniff_header`].
    #[inline]
    pub fn sniff_file(&self, file: &SelectedFile) -> Result<SniffedHeader, ValidationError> {
        let prefix = file
            .read_prefix(self.limit)
            .map_err(|err| ValidationError::Unreadable(err.to_string()))?;
        self.sniff_header(&prefix)
    }
}

/// Splits a header line into lowercased, unquoted cells.
fn parse_header(line: &str) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .split(DELIMITERS)
        .map(|cell| {
            cell.trim()
                .trim_matches(|ch| ch == '"' || ch == '\'')
                .to_lowercase()
        })
        .collect()
}

/// Lowercases and strips whitespace, underscores and hyphens.
fn normalize(column: &str) -> String {
    column
        .chars()
        .filter(|&ch| !ch.is_whitespace() && ch != '_' && ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns `true` if any non-empty header cell contains `required`.
///
/// Containment runs one way only: a header cell may carry extra words
/// around the logical name, but a short cell such as `date` does not
/// satisfy `valuedate`.
fn is_matched(required: &str, columns: &[String]) -> bool {
    columns
        .iter()
        .any(|col| !col.is_empty() && col.contains(required))
}
