//! Billables (installment loans)
//!
//! A billable is created once with its total payable amount and schedule
//! fixed, and is never updated afterwards. Its repayment status is derived
//! from the payment ledger on demand and never stored on the billable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::temporal::{add_weeks, whole_weeks_between};
use core_kernel::{BillableId, Money, Rate};

use crate::error::BillingError;

/// Terms applied to every new billable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    /// Number of equal weekly installments
    pub duration_weeks: u32,
    /// Flat interest applied to the principal once, at creation
    pub interest_rate: Rate,
}

/// A loan instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billable {
    /// Caller-supplied unique identifier
    pub id: BillableId,
    /// Original loan amount
    pub principal: Money,
    /// Total payable amount, `ceil(principal * (1 + rate))`
    pub amount: Money,
    /// Number of weekly installments
    pub duration_weeks: u32,
    /// When the billable was created
    pub created_at: DateTime<Utc>,
    /// `created_at` plus `duration_weeks` calendar weeks
    pub due_at: DateTime<Utc>,
}

impl Billable {
    /// Creates a new billable under the given terms
    ///
    /// # Arguments
    ///
    /// * `id` - Caller-supplied identifier, must not be blank
    /// * `principal` - Loan amount, must be positive
    /// * `terms` - Duration and interest rate
    /// * `created_at` - Creation instant, taken from the engine clock
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidInput` if the id is blank, the principal
    /// is not positive, or the amounts cannot be represented.
    pub fn new(
        id: BillableId,
        principal: Money,
        terms: LoanTerms,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BillingError> {
        if id.is_blank() {
            return Err(BillingError::invalid_input("id", "billable id must not be empty"));
        }
        if !principal.is_positive() {
            return Err(BillingError::invalid_input(
                "principal",
                format!("principal must be positive, got {}", principal),
            ));
        }
        if terms.duration_weeks == 0 {
            return Err(BillingError::invalid_input(
                "duration_weeks",
                "loan duration must be at least one week",
            ));
        }

        let amount = terms
            .interest_rate
            .mark_up(principal)
            .map_err(|e| BillingError::invalid_input("principal", e.to_string()))?;
        let due_at = add_weeks(created_at, terms.duration_weeks)
            .map_err(|e| BillingError::invalid_input("duration_weeks", e.to_string()))?;

        Ok(Self {
            id,
            principal,
            amount,
            duration_weeks: terms.duration_weeks,
            created_at,
            due_at,
        })
    }

    /// The fixed per-week payment, `floor(amount / duration_weeks)`
    pub fn weekly_installment(&self) -> Money {
        self.amount
            .split_floor(self.duration_weeks)
            .unwrap_or(Money::ZERO)
    }

    /// Whole weeks elapsed since creation, truncated toward zero
    pub fn age_weeks(&self, now: DateTime<Utc>) -> i64 {
        whole_weeks_between(self.created_at, now)
    }

    /// Returns true once `now` has reached the due date
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use rust_decimal_macros::dec;

    fn terms() -> LoanTerms {
        LoanTerms {
            duration_weeks: 50,
            interest_rate: Rate::new(dec!(0.10)),
        }
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_new_billable_amounts() {
        let billable = Billable::new(
            BillableId::new("loan-1"),
            Money::from_minor(5_000_000),
            terms(),
            created(),
        )
        .unwrap();

        assert_eq!(billable.amount, Money::from_minor(5_500_000));
        assert_eq!(billable.weekly_installment(), Money::from_minor(110_000));
        assert_eq!(billable.due_at, created() + TimeDelta::weeks(50));
        assert_eq!(billable.created_at, created());
    }

    #[test]
    fn test_blank_id_rejected() {
        let result = Billable::new(BillableId::new(" "), Money::from_minor(100), terms(), created());
        assert!(matches!(result, Err(BillingError::InvalidInput { field: "id", .. })));
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        for principal in [0, -1] {
            let result = Billable::new(
                BillableId::new("loan-1"),
                Money::from_minor(principal),
                terms(),
                created(),
            );
            assert!(matches!(result, Err(BillingError::InvalidInput { field: "principal", .. })));
        }
    }

    #[test]
    fn test_small_principal_has_zero_installment() {
        // 10 * 1.1 = 11 < 50 weeks
        let billable = Billable::new(BillableId::new("tiny"), Money::from_minor(10), terms(), created())
            .unwrap();
        assert_eq!(billable.amount, Money::from_minor(11));
        assert_eq!(billable.weekly_installment(), Money::ZERO);
    }

    #[test]
    fn test_age_and_due() {
        let billable = Billable::new(
            BillableId::new("loan-1"),
            Money::from_minor(5_000_000),
            terms(),
            created(),
        )
        .unwrap();

        assert_eq!(billable.age_weeks(created()), 0);
        assert_eq!(billable.age_weeks(created() + TimeDelta::days(20)), 2);
        assert!(!billable.is_past_due(created() + TimeDelta::weeks(49)));
        assert!(billable.is_past_due(billable.due_at));
    }
}
