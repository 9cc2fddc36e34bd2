//! Billing domain errors

use core_kernel::{BillableId, CoreError, Money, PortError};
use thiserror::Error;

/// Errors that can occur in the billing domain
///
/// Every variant carries enough context to identify the rule that was
/// violated. None of them is retried by the engine.
#[derive(Debug, Error)]
pub enum BillingError {
    /// A required field is missing or malformed
    #[error("Invalid input: {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// Payment amount does not match the fixed weekly installment
    #[error("Wrong payment amount {actual}: expected installment of {expected}")]
    InvalidAmount {
        expected: Money,
        actual: Money,
    },

    /// A billable with this identifier already exists
    #[error("Billable already exists: {0}")]
    DuplicateId(BillableId),

    /// The referenced billable does not exist
    #[error("Billable not found: {0}")]
    NotFound(BillableId),

    /// The ledger store failed for a reason unrelated to business rules
    #[error("Storage error: {0}")]
    Storage(#[source] PortError),

    /// The engine was constructed with an unusable configuration
    #[error("Invalid engine configuration: {0}")]
    Configuration(#[from] CoreError),
}

impl BillingError {
    /// Creates an InvalidInput error for the given field
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        BillingError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Translates a store error raised while looking up `id`
    ///
    /// A missing record becomes `NotFound`; everything else is a storage failure.
    pub fn from_lookup(id: &BillableId, error: PortError) -> Self {
        if error.is_not_found() {
            BillingError::NotFound(id.clone())
        } else {
            BillingError::Storage(error)
        }
    }

    /// Translates a store error raised while inserting `id`
    ///
    /// A uniqueness conflict becomes `DuplicateId`; everything else is a storage failure.
    pub fn from_insert(id: &BillableId, error: PortError) -> Self {
        if error.is_conflict() {
            BillingError::DuplicateId(id.clone())
        } else {
            BillingError::Storage(error)
        }
    }

    /// Returns true for errors caused by the caller's request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BillingError::Storage(_) | BillingError::Configuration(_))
    }
}

impl From<PortError> for BillingError {
    fn from(error: PortError) -> Self {
        BillingError::Storage(error)
    }
}
