//! CSV import result and backend error bodies.

use serde::{Deserialize, Serialize};

/// Success body of `POST /import-csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows stored as new transactions.
    #[serde(default)]
    pub imported: u64,
    /// Rows skipped because they were already present.
    #[serde(default)]
    pub duplicates: u64,
    /// Rows processed.
    #[serde(default)]
    pub total: u64,
    /// Server confirmation message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body the backend returns with non-success statuses.
///
/// `detail` is usually a string, but request validation failures carry a
/// list of objects instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    /// Raw detail value.
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// Returns the detail as display text.
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(text) = self.detail.as_str() {
            return text.to_owned();
        }
        if let Some(items) = self.detail.as_array() {
            return items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| item.to_string(), ToOwned::to_owned)
                })
                .collect::<Vec<_>>()
                .join("; ");
        }
        self.detail.to_string()
    }
}
