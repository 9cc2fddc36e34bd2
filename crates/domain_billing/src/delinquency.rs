//! Delinquency assessment
//!
//! A borrower is delinquent once the amount they should have paid by now,
//! had they never missed a week, exceeds what they actually paid by at
//! least `threshold` whole installments. The assessment is recomputed from
//! the clock and the ledger on every call; nothing is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::billable::Billable;

/// Inputs and outcome of a delinquency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelinquencyAssessment {
    /// Fixed per-week payment
    pub weekly_installment: Money,
    /// Whole weeks elapsed since the billable was created
    pub age_weeks: i64,
    /// `weekly_installment * age_weeks`
    pub expected_paid: Money,
    /// Latest accumulated payment total
    pub actual_paid: Money,
    /// `expected_paid - actual_paid`, negative when ahead of schedule
    pub shortfall: Money,
    /// Shortfall at which the billable becomes delinquent
    pub tolerance: Money,
    /// The due date has been reached
    pub past_due: bool,
    /// `shortfall >= tolerance`, never set while the installment is zero
    pub delinquent: bool,
}

impl DelinquencyAssessment {
    /// Assesses `billable` at instant `now`
    ///
    /// # Arguments
    ///
    /// * `billable` - The loan being checked
    /// * `actual_paid` - Accumulated total of its latest payment
    /// * `now` - Current instant from the engine clock
    /// * `threshold` - Number of missed installments tolerated
    pub fn assess(
        billable: &Billable,
        actual_paid: Money,
        now: DateTime<Utc>,
        threshold: u32,
    ) -> Self {
        let weekly_installment = billable.weekly_installment();
        let age_weeks = billable.age_weeks(now);
        let expected_paid = weekly_installment.saturating_mul(age_weeks);
        let shortfall = expected_paid.saturating_sub(actual_paid);
        let tolerance = weekly_installment.saturating_mul(i64::from(threshold));

        Self {
            weekly_installment,
            age_weeks,
            expected_paid,
            actual_paid,
            shortfall,
            tolerance,
            past_due: billable.is_past_due(now),
            delinquent: weekly_installment.is_positive() && shortfall >= tolerance,
        }
    }

    /// Number of whole installments the borrower is behind (zero when on
    /// schedule or ahead)
    pub fn missed_installments(&self) -> i64 {
        if self.weekly_installment.is_zero() || !self.shortfall.is_positive() {
            return 0;
        }
        self.shortfall.minor_units() / self.weekly_installment.minor_units()
    }
}
