//! Pre-built Test Fixtures
//!
//! The reference loan used across the suite: 5,000,000 borrowed at a flat
//! 10% over 50 weeks, repaid in installments of 110,000.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use core_kernel::{BillableId, Money, Rate};
use domain_billing::{EngineConfig, LoanTerms};
use rust_decimal_macros::dec;

/// Fixture for the reference loan
pub struct LoanFixtures;

impl LoanFixtures {
    /// Identifier of the reference loan
    pub fn billable_id() -> BillableId {
        BillableId::new("loan-100")
    }

    /// Principal of the reference loan
    pub fn principal() -> Money {
        Money::from_minor(5_000_000)
    }

    /// Total payable amount of the reference loan
    pub fn amount() -> Money {
        Money::from_minor(5_500_000)
    }

    /// Weekly installment of the reference loan
    pub fn installment() -> Money {
        Money::from_minor(110_000)
    }

    /// Flat 10% interest
    pub fn rate() -> Rate {
        Rate::new(dec!(0.10))
    }

    /// Fifty weekly installments
    pub fn duration_weeks() -> u32 {
        50
    }

    /// Two missed installments tolerated
    pub fn delinquency_threshold() -> u32 {
        2
    }

    /// Terms of the reference loan
    pub fn terms() -> LoanTerms {
        LoanTerms {
            duration_weeks: Self::duration_weeks(),
            interest_rate: Self::rate(),
        }
    }

    /// Engine configuration producing the reference loan
    pub fn engine_config() -> EngineConfig {
        EngineConfig {
            loan_duration_weeks: Self::duration_weeks(),
            interest_rate: Self::rate(),
            delinquency_threshold: Self::delinquency_threshold(),
        }
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant the reference loan is disbursed (Jan 1, 2024, 09:00 UTC)
    pub fn loan_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    /// `weeks` whole weeks after the loan start
    pub fn weeks_after_start(weeks: i64) -> DateTime<Utc> {
        Self::loan_start() + TimeDelta::weeks(weeks)
    }

    /// `days` days after the loan start
    pub fn days_after_start(days: i64) -> DateTime<Utc> {
        Self::loan_start() + TimeDelta::days(days)
    }
}
