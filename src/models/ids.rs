//! Newtype wrappers for backend row identifiers.
//!
//! The backend keys every table with an integer; wrapping them keeps a
//! report id from being passed where an account id is expected.

use serde::{Deserialize, Serialize};

/// Defines an integer-backed identifier newtype.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from the given value.
            #[inline]
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw integer value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user.
    UserId
}

define_id! {
    /// Identifier of a bank or wallet account.
    AccountId
}

define_id! {
    /// Identifier of a single transaction.
    TransactionId
}

define_id! {
    /// Identifier of a spending category.
    CategoryId
}

define_id! {
    /// Identifier of a generated monthly report.
    ReportId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_transparent_in_json() {
        let id = ReportId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: ReportId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn id_display() {
        assert_eq!(AccountId::new(7).to_string(), "7");
    }

    #[test]
    fn id_parses_from_cli_text() {
        let id: ReportId = " 12 ".parse().unwrap();
        assert_eq!(id.get(), 12);
        assert!("abc".parse::<ReportId>().is_err());
    }

    #[test]
    fn id_from_inner() {
        let id: TransactionId = 9_i64.into();
        assert_eq!(id.get(), 9);
    }

    #[test]
    fn ids_order_numerically() {
        assert!(CategoryId::new(2) < CategoryId::new(10));
    }
}
