//! Engine-level tests for domain_billing

use chrono::TimeDelta;
use proptest::prelude::*;

use core_kernel::{BillableId, Clock, Money};
use domain_billing::{BillingError, LedgerStore};
use test_utils::{
    assert_accumulation_chain, assert_all_installments, assert_outstanding, billable_id_strategy,
    engine_config_strategy, principal_strategy, LoanFixtures, TemporalFixtures, TestBillableBuilder,
    TestEngineBuilder,
};

// ============================================================================
// CreateBillable
// ============================================================================

mod create_billable_tests {
    use super::*;

    #[tokio::test]
    async fn test_reference_loan_terms() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;

        assert_eq!(loan.principal, LoanFixtures::principal());
        assert_eq!(loan.amount, LoanFixtures::amount());
        assert_eq!(loan.weekly_installment(), LoanFixtures::installment());
        assert_eq!(loan.duration_weeks, 50);
        assert_eq!(loan.created_at, TemporalFixtures::loan_start());
        assert_eq!(loan.due_at, TemporalFixtures::weeks_after_start(50));
    }

    #[tokio::test]
    async fn test_creation_is_stored_without_payments() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;

        assert_eq!(harness.store.get_billable(&loan.id).await.unwrap(), loan);
        assert!(harness.engine.list_payments(&loan.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_leaves_original_untouched() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        harness.advance_weeks(1);

        let err = harness
            .engine
            .create_billable(loan.id.clone(), Money::from_minor(42_000))
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::DuplicateId(_)));
        assert!(err.is_client_error());
        assert_eq!(harness.store.billable_count().await, 1);
        assert_eq!(harness.engine.get_billable(&loan.id).await.unwrap(), loan);
    }

    #[tokio::test]
    async fn test_amount_rounds_up() {
        let harness = TestEngineBuilder::new().with_duration_weeks(5).build();

        // 12,345 * 1.1 = 13,579.5
        let loan = harness
            .engine
            .create_billable(BillableId::new("odd"), Money::from_minor(12_345))
            .await
            .unwrap();
        assert_eq!(loan.amount, Money::from_minor(13_580));
        assert_eq!(loan.weekly_installment(), Money::from_minor(2_716));
    }

    #[tokio::test]
    async fn test_small_principal_is_accepted() {
        let harness = TestEngineBuilder::new().build();

        let loan = harness
            .engine
            .create_billable(BillableId::new("tiny"), Money::from_minor(10))
            .await
            .unwrap();
        assert_eq!(loan.amount, Money::from_minor(11));
        assert_eq!(loan.weekly_installment(), Money::ZERO);

        let err = harness
            .engine
            .record_payment(&loan.id, Money::from_minor(1), harness.now())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidAmount { expected, .. } if expected == Money::ZERO));

        harness.advance_weeks(4);
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());
    }
}

// ============================================================================
// RecordPayment
// ============================================================================

mod record_payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_repayment() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;

        for _ in 0..50 {
            harness.advance_weeks(1);
            harness.pay_installments(&loan.id, 1).await.unwrap();
        }

        let payments = harness.engine.list_payments(&loan.id).await.unwrap();
        assert_eq!(payments.len(), 50);
        assert_accumulation_chain(&payments);
        assert_all_installments(&payments, LoanFixtures::installment());

        let outstanding = harness.engine.get_outstanding(&loan.id).await.unwrap();
        assert_outstanding(&outstanding, Money::from_minor(5_500_000));
        assert!(outstanding.is_settled());
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rounding_remainder_stays_outstanding() {
        let harness = TestEngineBuilder::new().with_duration_weeks(3).build();
        // 1,000 * 1.1 = 1,100; installment 366; three payments leave 2
        let loan = harness
            .engine
            .create_billable(BillableId::new("remainder"), Money::from_minor(1_000))
            .await
            .unwrap();

        harness.pay_installments(&loan.id, 3).await.unwrap();

        let outstanding = harness.engine.get_outstanding(&loan.id).await.unwrap();
        assert_eq!(outstanding.outstanding, Money::from_minor(2));
    }

    #[tokio::test]
    async fn test_rejected_payment_appends_nothing() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        harness.pay_installments(&loan.id, 1).await.unwrap();

        let err = harness
            .engine
            .record_payment(&loan.id, Money::from_minor(220_000), harness.now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidAmount { expected, .. } if expected == LoanFixtures::installment()
        ));

        let outstanding = harness.engine.get_outstanding(&loan.id).await.unwrap();
        assert_outstanding(&outstanding, LoanFixtures::installment());
    }

    #[tokio::test]
    async fn test_paid_at_is_kept_and_created_at_is_clock() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        harness.advance_days(10);

        let paid_at = TemporalFixtures::days_after_start(7);
        let payment = harness
            .engine
            .record_payment(&loan.id, LoanFixtures::installment(), paid_at)
            .await
            .unwrap();

        assert_eq!(payment.paid_at, paid_at);
        assert_eq!(payment.created_at, TemporalFixtures::days_after_start(10));
    }

    #[tokio::test]
    async fn test_concurrent_payments_across_billables() {
        let harness = TestEngineBuilder::new().build();
        let ids: Vec<BillableId> = (0..4).map(|i| BillableId::new(format!("loan-{i}"))).collect();
        for id in &ids {
            harness.engine.create_billable(id.clone(), LoanFixtures::principal()).await.unwrap();
        }

        let mut handles = Vec::new();
        for id in &ids {
            for _ in 0..5 {
                let engine = harness.engine.clone();
                let id = id.clone();
                let at = harness.now();
                handles.push(tokio::spawn(async move {
                    engine.record_payment(&id, LoanFixtures::installment(), at).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in &ids {
            let payments = harness.engine.list_payments(id).await.unwrap();
            assert_eq!(payments.len(), 5);
            assert_accumulation_chain(&payments);
        }
    }
}

// ============================================================================
// Delinquency
// ============================================================================

mod delinquency_tests {
    use super::*;

    #[tokio::test]
    async fn test_reference_scenario() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());

        harness.advance_days(14);
        assert!(harness.engine.is_delinquent(&loan.id).await.unwrap());

        harness.pay_installments(&loan.id, 1).await.unwrap();
        harness.advance_days(14);
        assert!(harness.engine.is_delinquent(&loan.id).await.unwrap());

        harness.pay_installments(&loan.id, 3).await.unwrap();
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_week_does_not_count() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;

        harness.clock.advance(TimeDelta::days(14) - TimeDelta::seconds(1));
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());

        harness.clock.advance(TimeDelta::seconds(1));
        assert!(harness.engine.is_delinquent(&loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_higher_threshold_tolerates_more() {
        let harness = TestEngineBuilder::new().with_threshold(4).build();
        let loan = harness.create_reference_loan().await;

        harness.advance_weeks(3);
        let assessment = harness.engine.assess_delinquency(&loan.id).await.unwrap();
        assert_eq!(assessment.missed_installments(), 3);
        assert!(!assessment.delinquent);

        harness.advance_weeks(1);
        assert!(harness.engine.is_delinquent(&loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_prepaying_keeps_borrower_current() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        harness.pay_installments(&loan.id, 5).await.unwrap();

        harness.advance_weeks(6);
        assert!(!harness.engine.is_delinquent(&loan.id).await.unwrap());

        harness.advance_weeks(1);
        assert!(harness.engine.is_delinquent(&loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_past_due_and_unpaid() {
        let harness = TestEngineBuilder::new().build();
        let loan = harness.create_reference_loan().await;
        harness.advance_weeks(60);

        let assessment = harness.engine.assess_delinquency(&loan.id).await.unwrap();
        assert!(assessment.past_due);
        assert_eq!(assessment.missed_installments(), 60);
        assert_eq!(assessment.expected_paid, Money::from_minor(6_600_000));
        assert!(assessment.delinquent);
    }
}

// ============================================================================
// Store contract
// ============================================================================

mod store_tests {
    use super::*;
    use domain_billing::ports::memory::InMemoryLedgerStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_engine_over_prepopulated_store() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let billable = TestBillableBuilder::new().with_id("seeded").build();
        store.insert_billable(&billable).await.unwrap();

        let (engine, clock) = TestEngineBuilder::new().build_with_store(store);
        clock.advance_days(7);

        engine
            .record_payment(&billable.id, billable.weekly_installment(), clock.now())
            .await
            .unwrap();
        let outstanding = engine.get_outstanding(&billable.id).await.unwrap();
        assert_outstanding(&outstanding, LoanFixtures::installment());
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_amount_is_ceiling_of_markup(
        config in engine_config_strategy(),
        principal in principal_strategy(),
        id in billable_id_strategy()
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let harness = TestEngineBuilder::new()
            .with_duration_weeks(config.loan_duration_weeks)
            .with_interest_rate(config.interest_rate)
            .with_threshold(config.delinquency_threshold)
            .build();

        let loan = rt.block_on(harness.engine.create_billable(id, principal)).unwrap();
        prop_assert!(loan.amount >= loan.principal);
        prop_assert_eq!(loan.amount, config.interest_rate.mark_up(principal).unwrap());
        prop_assert!(loan.weekly_installment().is_positive());
    }

    #[test]
    fn prop_outstanding_tracks_payments(payments in 0usize..20usize) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let harness = TestEngineBuilder::new().build();

        let outstanding = rt.block_on(async {
            let loan = harness.create_reference_loan().await;
            harness.pay_installments(&loan.id, payments).await.unwrap();
            harness.engine.get_outstanding(&loan.id).await.unwrap()
        });

        prop_assert_eq!(
            outstanding.paid,
            LoanFixtures::installment().saturating_mul(payments as i64)
        );
        prop_assert_eq!(outstanding.outstanding, outstanding.bill.saturating_sub(outstanding.paid));
    }
}
