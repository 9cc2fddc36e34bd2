//! Payment ledger entries
//!
//! The ledger is append-only. Each payment carries the running total of all
//! payments made against its billable up to and including itself, in
//! insertion order. That total is computed in exactly one place,
//! [`PendingPayment::post`], which ledger stores call while holding their
//! per-billable serialization point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillableId, Money, MoneyError, PaymentId};

/// A payment that has been validated but not yet appended to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    pub id: PaymentId,
    pub billable_id: BillableId,
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PendingPayment {
    /// Creates a pending payment with a fresh time-ordered identifier
    pub fn new(
        billable_id: BillableId,
        amount: Money,
        paid_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            billable_id,
            amount,
            paid_at,
            created_at,
        }
    }

    /// Places this payment on top of the ledger whose latest accumulated
    /// total is `prior_accumulated` (zero for an empty ledger)
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the running total is not representable
    pub fn post(self, prior_accumulated: Money) -> Result<Payment, MoneyError> {
        let amount_accumulated = prior_accumulated.checked_add(self.amount)?;

        Ok(Payment {
            id: self.id,
            billable_id: self.billable_id,
            amount: self.amount,
            amount_accumulated,
            paid_at: self.paid_at,
            created_at: self.created_at,
        })
    }
}

/// A persisted installment payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// System-generated identifier
    pub id: PaymentId,
    /// Billable this payment belongs to
    pub billable_id: BillableId,
    /// Amount of this single payment
    pub amount: Money,
    /// Running total for the billable, including this payment
    pub amount_accumulated: Money,
    /// When the payment was nominally made (caller-supplied)
    pub paid_at: DateTime<Utc>,
    /// When the payment was recorded
    pub created_at: DateTime<Utc>,
}

/// Accumulated total carried by the latest payment, zero for an empty ledger
pub fn accumulated_total(latest: Option<&Payment>) -> Money {
    latest.map_or(Money::ZERO, |p| p.amount_accumulated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn pending(amount: i64) -> PendingPayment {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        PendingPayment::new(BillableId::new("loan-1"), Money::from_minor(amount), at, at)
    }

    #[test]
    fn test_first_payment_accumulates_from_zero() {
        let payment = pending(110_000).post(Money::ZERO).unwrap();
        assert_eq!(payment.amount_accumulated, Money::from_minor(110_000));
    }

    #[test]
    fn test_post_keeps_identity_and_timestamps() {
        let draft = pending(110_000);
        let (id, paid_at) = (draft.id, draft.paid_at);

        let payment = draft.post(Money::from_minor(220_000)).unwrap();
        assert_eq!(payment.id, id);
        assert_eq!(payment.paid_at, paid_at);
        assert_eq!(payment.amount, Money::from_minor(110_000));
        assert_eq!(payment.amount_accumulated, Money::from_minor(330_000));
    }

    #[test]
    fn test_backdated_payment_still_stacks_on_latest() {
        let first = pending(110_000).post(Money::ZERO).unwrap();

        let mut backdated = pending(110_000);
        backdated.paid_at = first.paid_at - TimeDelta::days(30);
        let second = backdated.post(accumulated_total(Some(&first))).unwrap();

        assert_eq!(second.amount_accumulated, Money::from_minor(220_000));
    }

    #[test]
    fn test_post_overflow() {
        let result = pending(1).post(Money::from_minor(i64::MAX));
        assert_eq!(result, Err(MoneyError::Overflow));
    }

    #[test]
    fn test_accumulated_total_empty_ledger() {
        assert_eq!(accumulated_total(None), Money::ZERO);
    }
}
