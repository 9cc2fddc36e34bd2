//! Billing DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{Money, PaymentId};
use domain_billing::{Billable, DelinquencyAssessment, Outstanding, Payment};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillableRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub billable_id: String,
    #[validate(range(min = 1, message = "must be positive"))]
    pub amount_principal: i64,
}

/// Rejects empty and whitespace-only strings
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(std::borrow::Cow::Borrowed("must not be blank"));
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct MakePaymentRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub amount: i64,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BillableResponse {
    pub id: String,
    pub principal: Money,
    pub amount: Money,
    pub dur_week: u32,
    pub weekly_installment: Money,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl From<Billable> for BillableResponse {
    fn from(billable: Billable) -> Self {
        Self {
            weekly_installment: billable.weekly_installment(),
            id: billable.id.into_inner(),
            principal: billable.principal,
            amount: billable.amount,
            dur_week: billable.duration_weeks,
            created_at: billable.created_at,
            due_at: billable.due_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub billable_id: String,
    pub amount: Money,
    pub amount_accumulated: Money,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            billable_id: payment.billable_id.into_inner(),
            amount: payment.amount,
            amount_accumulated: payment.amount_accumulated,
            paid_at: payment.paid_at,
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutstandingResponse {
    pub principal: Money,
    pub bill: Money,
    pub paid: Money,
    pub outstanding: Money,
}

impl From<Outstanding> for OutstandingResponse {
    fn from(o: Outstanding) -> Self {
        Self {
            principal: o.principal,
            bill: o.bill,
            paid: o.paid,
            outstanding: o.outstanding,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DelinquencyResponse {
    pub delinquency: bool,
    pub age_weeks: i64,
    pub expected_paid: Money,
    pub actual_paid: Money,
    pub missed_installments: i64,
    pub past_due: bool,
}

impl From<DelinquencyAssessment> for DelinquencyResponse {
    fn from(a: DelinquencyAssessment) -> Self {
        Self {
            delinquency: a.delinquent,
            age_weeks: a.age_weeks,
            expected_paid: a.expected_paid,
            actual_paid: a.actual_paid,
            missed_installments: a.missed_installments(),
            past_due: a.past_due,
        }
    }
}
