//! Bank and wallet account models.

use serde::{Deserialize, Serialize};

use super::AccountId;

/// An account as returned by `GET /accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub account_id: AccountId,
    /// Display name.
    pub account_name: String,
    /// Free-form type such as `checking` or `savings`.
    pub account_type: String,
    /// Current balance in `currency`.
    pub account_balance: f64,
    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Bank or platform holding the account.
    #[serde(default)]
    pub platform_name: Option<String>,
}

/// Currency assumed when the backend omits one.
fn default_currency() -> String {
    "USD".to_owned()
}

/// Body of `POST /accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opening balance.
    pub balance: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Bank or platform holding the account.
    pub platform_name: Option<String>,
}

/// Body of `PUT /accounts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// New display name.
    pub name: String,
    /// New account type.
    #[serde(rename = "accountType")]
    pub kind: String,
    /// Corrected balance.
    pub balance: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Bank or platform holding the account.
    pub platform_name: Option<String>,
}

impl From<NewAccount> for AccountUpdate {
    #[inline]
    fn from(account: NewAccount) -> Self {
        Self {
            name: account.name,
            kind: account.kind,
            balance: account.balance,
            currency: account.currency,
            platform_name: account.platform_name,
        }
    }
}

/// Body of `DELETE /accounts/{id}`; the backend re-checks the password.
#[derive(Clone, Serialize)]
pub struct DeleteAccountRequest {
    /// Account owner's password.
    pub password: String,
}

impl core::fmt::Debug for DeleteAccountRequest {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeleteAccountRequest")
            .field("password", &"[REDACTED]")
            .finish()
    }
}
