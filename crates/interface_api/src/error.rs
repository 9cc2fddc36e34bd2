//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::Money;
use domain_billing::BillingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Wrong payment amount {actual}: expected {expected}")]
    InvalidAmount { expected: Money, actual: Money },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_amount: Option<Money>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, expected_amount) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::InvalidAmount { expected, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_amount", Some(*expected))
            }
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", None),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None)
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::InvalidAmount { .. } => self.to_string(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            expected_amount,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidInput { .. } => ApiError::BadRequest(err.to_string()),
            BillingError::InvalidAmount { expected, actual } => {
                ApiError::InvalidAmount { expected, actual }
            }
            BillingError::DuplicateId(_) => ApiError::Conflict(err.to_string()),
            BillingError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BillingError::Storage(ref source) if source.is_transient() => {
                error!(error = %err, "Ledger store unavailable");
                ApiError::ServiceUnavailable("storage temporarily unavailable".to_string())
            }
            BillingError::Storage(_) | BillingError::Configuration(_) => {
                error!(error = %err, "Billing engine failure");
                ApiError::Internal("storage failure".to_string())
            }
        }
    }
}
