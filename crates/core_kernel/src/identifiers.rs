//! Strongly-typed identifiers for domain entities
//!
//! Generated identifiers are newtype wrappers around UUIDs, which provides
//! type safety and prevents accidental mixing of different identifier types.
//! Billable identifiers are chosen by the caller and therefore wrap a string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(PaymentId, "PAY");

/// Caller-supplied identifier of a billable (loan)
///
/// The value is opaque to the system; uniqueness is enforced by the ledger
/// store, and blank values are rejected by the billing engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillableId(String);

impl BillableId {
    /// Wraps a caller-supplied identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Consumes the identifier and returns the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BillableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BillableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BillableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for BillableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_id_display() {
        let id = PaymentId::new_v7();
        assert!(id.to_string().starts_with("PAY-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = PaymentId::new_v7();
        let parsed: PaymentId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_billable_id_blank() {
        assert!(BillableId::new("").is_blank());
        assert!(BillableId::new("  \t").is_blank());
        assert!(!BillableId::new("loan-1").is_blank());
    }
}
