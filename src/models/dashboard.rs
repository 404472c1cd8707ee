//! Currency-converted dashboard summary.

use serde::{Deserialize, Serialize};

use super::TransactionRecord;

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    /// Sum of all balances in the base currency.
    #[serde(default)]
    pub total_balance: f64,
    /// Number of accounts.
    #[serde(default)]
    pub account_count: u64,
}

/// An account entry in the dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAccount {
    /// Display name.
    #[serde(default)]
    pub account_name: Option<String>,
    /// Currency the account is held in before conversion.
    pub original_currency: String,
    /// Balance converted to the base currency.
    #[serde(default)]
    pub converted_balance: Option<f64>,
}

/// Body of `GET /api/currency/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Whether conversion succeeded.
    #[serde(default)]
    pub success: bool,
    /// Currency all totals are expressed in.
    #[serde(default)]
    pub base_currency: String,
    /// Headline numbers.
    #[serde(default)]
    pub statistics: DashboardStatistics,
    /// Latest transactions, newest first.
    #[serde(default)]
    pub recent_transactions: Vec<TransactionRecord>,
    /// Accounts that contributed to the totals.
    #[serde(default)]
    pub accounts: Vec<DashboardAccount>,
}

impl DashboardResponse {
    /// Returns the distinct source currencies in first-seen order.
    #[inline]
    #[must_use]
    pub fn source_currencies(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for account in &self.accounts {
            if !seen.contains(&account.original_currency.as_str()) {
                seen.push(&account.original_currency);
            }
        }
        seen
    }

    /// Returns the "converted from" note, shown only when more than one
    /// source currency contributed.
    #[inline]
    #[must_use]
    pub fn conversion_note(&self) -> Option<String> {
        let currencies = self.source_currencies();
        (currencies.len() > 1).then(|| format!("Converted from: {}", currencies.join(", ")))
    }
}
