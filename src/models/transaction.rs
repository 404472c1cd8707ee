//! Transaction model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CategoryId, TransactionId, UserId};

/// A posted transaction as returned by `GET /transactions`.
///
/// Positive amounts are income, negative amounts are expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier.
    #[serde(rename = "transaction_id")]
    pub id: TransactionId,
    /// Owning user.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Display name (payee or statement text).
    pub name: String,
    /// Signed amount in the account currency.
    pub amount: f64,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Booking date. Timestamps are truncated to their date.
    #[serde(with = "date_or_datetime")]
    pub transaction_date: NaiveDate,
    /// Assigned category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionRecord {
    /// Returns `true` for income (zero counts as income).
    #[inline]
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.amount >= 0.0_f64
    }
}

/// Accepts `YYYY-MM-DD` or any ISO timestamp starting with one.
mod date_or_datetime {
    use chrono::NaiveDate;
    use serde::{Deserialize as _, Deserializer, Serializer};

    /// Date format used on the wire.
    const FORMAT: &str = "%Y-%m-%d";

    /// Serializes as `YYYY-MM-DD`.
    pub(super) fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    /// Deserializes from a date or a timestamp, keeping the date part.
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let date_part = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(date_part, FORMAT).map_err(serde::de::Error::custom)
    }
}
