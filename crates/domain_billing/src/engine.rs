//! Billing engine
//!
//! The engine owns no state of its own. Every operation reads the clock,
//! talks to the ledger store and derives its answer from what the store
//! returns, so any number of engine clones can share one store.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use tracing::{debug, info, instrument, warn};

use core_kernel::{BillableId, Clock, CoreError, Money, Rate};

use crate::billable::{Billable, LoanTerms};
use crate::delinquency::DelinquencyAssessment;
use crate::error::BillingError;
use crate::outstanding::Outstanding;
use crate::payment::{accumulated_total, Payment, PendingPayment};
use crate::ports::LedgerStore;

/// Loan terms and delinquency tolerance applied by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of weekly installments for every new billable
    pub loan_duration_weeks: u32,
    /// Flat interest rate applied at creation
    pub interest_rate: Rate,
    /// Missed installments tolerated before a billable is delinquent
    pub delinquency_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loan_duration_weeks: 50,
            interest_rate: Rate::new(dec!(0.10)),
            delinquency_threshold: 2,
        }
    }
}

impl EngineConfig {
    /// Checks that the configuration can produce valid billables
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if the duration or threshold is
    /// zero or the interest rate is not strictly positive
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.loan_duration_weeks == 0 {
            return Err(CoreError::configuration("loan duration must be at least one week"));
        }
        if !self.interest_rate.is_positive() {
            return Err(CoreError::configuration(format!(
                "interest rate must be positive, got {}",
                self.interest_rate
            )));
        }
        if self.delinquency_threshold == 0 {
            return Err(CoreError::configuration(
                "delinquency threshold must be at least one installment",
            ));
        }
        Ok(())
    }

    /// Terms given to each new billable
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            duration_weeks: self.loan_duration_weeks,
            interest_rate: self.interest_rate,
        }
    }
}

/// Loan billing engine
///
/// # Example
///
/// ```rust,ignore
/// let engine = BillingEngine::new(store, Arc::new(SystemClock), EngineConfig::default())?;
///
/// let billable = engine.create_billable(BillableId::new("loan-1"), Money::from_minor(5_000_000)).await?;
/// engine.record_payment(&billable.id, billable.weekly_installment(), Utc::now()).await?;
///
/// let outstanding = engine.get_outstanding(&billable.id).await?;
/// assert_eq!(outstanding.outstanding, Money::from_minor(5_390_000));
/// ```
#[derive(Clone)]
pub struct BillingEngine {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl fmt::Debug for BillingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BillingEngine {
    /// Creates an engine over the given store and clock
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Configuration` if `config` fails validation
    pub fn new(
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Result<Self, BillingError> {
        config.validate()?;
        Ok(Self { store, clock, config })
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The clock this engine reads
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Creates a new billable for `principal` under the configured terms
    ///
    /// # Arguments
    ///
    /// * `id` - Caller-supplied identifier, unique across all billables
    /// * `principal` - Loan amount in minor units
    ///
    /// # Returns
    ///
    /// The persisted billable with its total amount and due date
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - blank id or non-positive principal
    /// * `DuplicateId` - a billable with this id already exists
    /// * `Storage` - the store failed
    #[instrument(skip(self), fields(billable_id = %id, principal = %principal))]
    pub async fn create_billable(
        &self,
        id: BillableId,
        principal: Money,
    ) -> Result<Billable, BillingError> {
        let billable = Billable::new(id, principal, self.config.terms(), self.clock.now())?;

        self.store
            .insert_billable(&billable)
            .await
            .map_err(|e| BillingError::from_insert(&billable.id, e))?;

        info!(
            amount = %billable.amount,
            due_at = %billable.due_at,
            "Billable created"
        );
        Ok(billable)
    }

    /// Records one weekly installment payment
    ///
    /// The amount must equal the billable's weekly installment exactly.
    /// Partial payments and prepayments are rejected.
    ///
    /// # Arguments
    ///
    /// * `billable_id` - The billable being paid
    /// * `amount` - Payment amount in minor units
    /// * `paid_at` - When the borrower made the payment
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - blank id or non-positive amount
    /// * `NotFound` - unknown billable
    /// * `InvalidAmount` - amount differs from the weekly installment
    /// * `Storage` - the store failed; nothing was appended
    #[instrument(skip(self), fields(billable_id = %billable_id, amount = %amount))]
    pub async fn record_payment(
        &self,
        billable_id: &BillableId,
        amount: Money,
        paid_at: DateTime<Utc>,
    ) -> Result<Payment, BillingError> {
        if billable_id.is_blank() {
            return Err(BillingError::invalid_input("billable_id", "billable id must not be empty"));
        }
        if !amount.is_positive() {
            return Err(BillingError::invalid_input(
                "amount",
                format!("payment amount must be positive, got {}", amount),
            ));
        }

        let billable = self.load(billable_id).await?;

        let expected = billable.weekly_installment();
        if amount != expected {
            warn!(expected = %expected, "Payment rejected: amount does not match installment");
            return Err(BillingError::InvalidAmount {
                expected,
                actual: amount,
            });
        }

        let pending = PendingPayment::new(billable.id.clone(), amount, paid_at, self.clock.now());
        let payment = self
            .store
            .append_payment(pending)
            .await
            .map_err(|e| BillingError::from_lookup(billable_id, e))?;

        info!(
            payment_id = %payment.id,
            amount_accumulated = %payment.amount_accumulated,
            "Payment recorded"
        );
        if Outstanding::compute(&billable, payment.amount_accumulated).is_settled() {
            info!(amount = %billable.amount, "Billable fully repaid");
        }
        Ok(payment)
    }

    /// Returns the remaining payable amount of a billable
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown billable
    /// * `Storage` - the store failed
    #[instrument(skip(self), fields(billable_id = %billable_id))]
    pub async fn get_outstanding(&self, billable_id: &BillableId) -> Result<Outstanding, BillingError> {
        let billable = self.load(billable_id).await?;
        let paid = self.paid_to_date(billable_id).await?;

        let outstanding = Outstanding::compute(&billable, paid);
        debug!(
            paid = %paid,
            outstanding = %outstanding.outstanding,
            settled = outstanding.is_settled(),
            "Outstanding computed"
        );
        Ok(outstanding)
    }

    /// Returns true if the borrower has fallen at least `delinquency_threshold`
    /// installments behind schedule
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown billable
    /// * `Storage` - the store failed
    pub async fn is_delinquent(&self, billable_id: &BillableId) -> Result<bool, BillingError> {
        Ok(self.assess_delinquency(billable_id).await?.delinquent)
    }

    /// Computes the full delinquency assessment at the current instant
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown billable
    /// * `Storage` - the store failed
    #[instrument(skip(self), fields(billable_id = %billable_id))]
    pub async fn assess_delinquency(
        &self,
        billable_id: &BillableId,
    ) -> Result<DelinquencyAssessment, BillingError> {
        let billable = self.load(billable_id).await?;
        let actual_paid = self.paid_to_date(billable_id).await?;

        let assessment = DelinquencyAssessment::assess(
            &billable,
            actual_paid,
            self.clock.now(),
            self.config.delinquency_threshold,
        );

        if assessment.delinquent {
            warn!(
                age_weeks = assessment.age_weeks,
                expected_paid = %assessment.expected_paid,
                actual_paid = %assessment.actual_paid,
                missed_installments = assessment.missed_installments(),
                past_due = assessment.past_due,
                "Billable is delinquent"
            );
        } else {
            debug!(
                age_weeks = assessment.age_weeks,
                shortfall = %assessment.shortfall,
                "Billable is current"
            );
        }
        Ok(assessment)
    }

    /// Returns the stored billable
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown billable
    /// * `Storage` - the store failed
    pub async fn get_billable(&self, billable_id: &BillableId) -> Result<Billable, BillingError> {
        self.load(billable_id).await
    }

    /// Returns the billable's payments in the order they were recorded
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown billable
    /// * `Storage` - the store failed
    #[instrument(skip(self), fields(billable_id = %billable_id))]
    pub async fn list_payments(&self, billable_id: &BillableId) -> Result<Vec<Payment>, BillingError> {
        let payments = self
            .store
            .list_payments(billable_id)
            .await
            .map_err(|e| BillingError::from_lookup(billable_id, e))?;

        debug!(count = payments.len(), "Payments listed");
        Ok(payments)
    }

    async fn load(&self, billable_id: &BillableId) -> Result<Billable, BillingError> {
        self.store
            .get_billable(billable_id)
            .await
            .map_err(|e| BillingError::from_lookup(billable_id, e))
    }

    async fn paid_to_date(&self, billable_id: &BillableId) -> Result<Money, BillingError> {
        let latest = self
            .store
            .latest_payment(billable_id)
            .await
            .map_err(|e| BillingError::from_lookup(billable_id, e))?;
        Ok(accumulated_total(latest.as_ref()))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ports::memory::InMemoryLedgerStore;
    use chrono::TimeZone;
    use core_kernel::ManualClock;
    use proptest::prelude::*;

    fn engine(weeks: u32) -> BillingEngine {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        BillingEngine::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(ManualClock::new(start)),
            EngineConfig { loan_duration_weeks: weeks, ..Default::default() },
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn accumulated_is_payments_times_installment(
            principal in 1_000i64..100_000_000i64,
            weeks in 1u32..60u32,
            payments in 0usize..15usize
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let engine = engine(weeks);
                let id = BillableId::new("prop-loan");
                let billable = engine.create_billable(id.clone(), Money::from_minor(principal)).await.unwrap();
                let installment = billable.weekly_installment();

                for _ in 0..payments {
                    engine.record_payment(&id, installment, billable.created_at).await.unwrap();
                }

                let outstanding = engine.get_outstanding(&id).await.unwrap();
                prop_assert_eq!(outstanding.paid, installment.saturating_mul(payments as i64));
                prop_assert_eq!(outstanding.outstanding, billable.amount.saturating_sub(outstanding.paid));
                prop_assert!(billable.amount >= billable.principal);
                Ok(())
            })?;
        }

        #[test]
        fn never_delinquent_at_creation(principal in 1_000i64..100_000_000i64) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let delinquent = rt.block_on(async {
                let engine = engine(50);
                let id = BillableId::new("prop-loan");
                engine.create_billable(id.clone(), Money::from_minor(principal)).await.unwrap();
                engine.is_delinquent(&id).await.unwrap()
            });
            prop_assert!(!delinquent);
        }
    }
}
