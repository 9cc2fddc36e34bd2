//! Property-Based Test Generators
//!
//! Proptest strategies producing inputs that satisfy the engine's
//! preconditions.

use core_kernel::{BillableId, Money, Rate};
use domain_billing::EngineConfig;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for principals large enough for any duration up to 520 weeks
pub fn principal_strategy() -> impl Strategy<Value = Money> {
    (1_000i64..10_000_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for positive rates between 0.01% and 100%, at basis-point precision
pub fn rate_strategy() -> impl Strategy<Value = Rate> {
    (1i64..=10_000i64).prop_map(|bp| Rate::new(Decimal::new(bp, 4)))
}

/// Strategy for loan durations from one week to ten years
pub fn duration_weeks_strategy() -> impl Strategy<Value = u32> {
    1u32..=520u32
}

/// Strategy for delinquency thresholds
pub fn threshold_strategy() -> impl Strategy<Value = u32> {
    1u32..=10u32
}

/// Strategy for non-blank billable ids
pub fn billable_id_strategy() -> impl Strategy<Value = BillableId> {
    "[a-z][a-z0-9-]{2,20}".prop_map(BillableId::new)
}

/// Strategy for valid engine configurations
pub fn engine_config_strategy() -> impl Strategy<Value = EngineConfig> {
    (duration_weeks_strategy(), rate_strategy(), threshold_strategy()).prop_map(
        |(loan_duration_weeks, interest_rate, delinquency_threshold)| EngineConfig {
            loan_duration_weeks,
            interest_rate,
            delinquency_threshold,
        },
    )
}
