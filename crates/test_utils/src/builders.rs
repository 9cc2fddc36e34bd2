//! Test Data Builders
//!
//! Builders for engines and billables with sensible defaults, so tests only
//! spell out what they are about.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use core_kernel::{BillableId, Clock, ManualClock, Money, Rate};
use domain_billing::ports::memory::InMemoryLedgerStore;
use domain_billing::{Billable, BillingEngine, BillingError, EngineConfig, LedgerStore, Payment};

use crate::fixtures::{LoanFixtures, TemporalFixtures};

/// Builder for a billing engine driven by a manual clock
///
/// # Example
///
/// ```rust,ignore
/// let harness = TestEngineBuilder::new().with_threshold(3).build();
/// let loan = harness.create_reference_loan().await;
/// harness.advance_weeks(2);
/// ```
pub struct TestEngineBuilder {
    config: EngineConfig,
    start: DateTime<Utc>,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngineBuilder {
    /// Creates a builder for the reference loan terms, starting at the
    /// reference loan start
    pub fn new() -> Self {
        Self {
            config: LoanFixtures::engine_config(),
            start: TemporalFixtures::loan_start(),
        }
    }

    /// Sets the loan duration in weeks
    pub fn with_duration_weeks(mut self, weeks: u32) -> Self {
        self.config.loan_duration_weeks = weeks;
        self
    }

    /// Sets the interest rate
    pub fn with_interest_rate(mut self, rate: Rate) -> Self {
        self.config.interest_rate = rate;
        self
    }

    /// Sets the delinquency threshold
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.config.delinquency_threshold = threshold;
        self
    }

    /// Sets the instant the manual clock starts at
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Builds an engine over a fresh in-memory store
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid
    pub fn build(self) -> TestEngine {
        let store = Arc::new(InMemoryLedgerStore::new());
        let clock = Arc::new(ManualClock::new(self.start));
        let engine = BillingEngine::new(store.clone(), clock.clone(), self.config)
            .expect("test engine configuration must be valid");

        TestEngine { engine, store, clock }
    }

    /// Builds an engine over the given store
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid
    pub fn build_with_store(self, store: Arc<dyn LedgerStore>) -> (BillingEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(self.start));
        let engine = BillingEngine::new(store, clock.clone(), self.config)
            .expect("test engine configuration must be valid");
        (engine, clock)
    }
}

/// A billing engine together with its in-memory store and manual clock
pub struct TestEngine {
    pub engine: BillingEngine,
    pub store: Arc<InMemoryLedgerStore>,
    pub clock: Arc<ManualClock>,
}

impl TestEngine {
    /// Current instant of the engine clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Moves the clock forward by whole weeks
    pub fn advance_weeks(&self, weeks: i64) {
        self.clock.advance(TimeDelta::weeks(weeks));
    }

    /// Moves the clock forward by whole days
    pub fn advance_days(&self, days: i64) {
        self.clock.advance_days(days);
    }

    /// Creates the reference loan
    ///
    /// # Panics
    ///
    /// Panics if creation fails
    pub async fn create_reference_loan(&self) -> Billable {
        self.engine
            .create_billable(LoanFixtures::billable_id(), LoanFixtures::principal())
            .await
            .expect("reference loan creation failed")
    }

    /// Pays `count` weekly installments at the current instant
    pub async fn pay_installments(&self, id: &BillableId, count: usize) -> Result<Vec<Payment>, BillingError> {
        let billable = self.engine.get_billable(id).await?;
        let mut payments = Vec::with_capacity(count);
        for _ in 0..count {
            payments.push(
                self.engine
                    .record_payment(id, billable.weekly_installment(), self.now())
                    .await?,
            );
        }
        Ok(payments)
    }
}

/// Builder for billables constructed directly, bypassing the engine
pub struct TestBillableBuilder {
    id: BillableId,
    principal: Money,
    config: EngineConfig,
    created_at: DateTime<Utc>,
}

impl Default for TestBillableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBillableBuilder {
    /// Creates a builder for the reference loan
    pub fn new() -> Self {
        Self {
            id: LoanFixtures::billable_id(),
            principal: LoanFixtures::principal(),
            config: LoanFixtures::engine_config(),
            created_at: TemporalFixtures::loan_start(),
        }
    }

    /// Sets the billable id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = BillableId::new(id);
        self
    }

    /// Sets the principal in minor units
    pub fn with_principal(mut self, minor_units: i64) -> Self {
        self.principal = Money::from_minor(minor_units);
        self
    }

    /// Sets the loan duration in weeks
    pub fn with_duration_weeks(mut self, weeks: u32) -> Self {
        self.config.loan_duration_weeks = weeks;
        self
    }

    /// Sets the creation instant
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Builds the billable
    ///
    /// # Panics
    ///
    /// Panics if the inputs do not form a valid billable
    pub fn build(self) -> Billable {
        Billable::new(self.id, self.principal, self.config.terms(), self.created_at)
            .expect("test billable must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_builder_defaults() {
        let harness = TestEngineBuilder::new().build();
        assert_eq!(harness.now(), TemporalFixtures::loan_start());

        let loan = harness.create_reference_loan().await;
        assert_eq!(loan.amount, LoanFixtures::amount());

        harness.advance_weeks(1);
        assert_eq!(harness.now(), TemporalFixtures::weeks_after_start(1));
    }

    #[tokio::test]
    async fn test_pay_installments() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;

        let payments = harness.pay_installments(&loan.id, 2).await.unwrap();
        assert_eq!(payments[1].amount_accumulated, Money::from_minor(220_000));
        assert_eq!(harness.store.payment_count().await, 2);
    }

    #[test]
    fn test_billable_builder() {
        let billable = TestBillableBuilder::new()
            .with_id("short")
            .with_principal(1_000)
            .with_duration_weeks(10)
            .build();

        assert_eq!(billable.id.as_str(), "short");
        assert_eq!(billable.amount, Money::from_minor(1_100));
        assert_eq!(billable.weekly_installment(), Money::from_minor(110));
    }
}
