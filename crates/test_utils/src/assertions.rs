//! Custom Test Assertions
//!
//! Assertion helpers for ledger invariants that give more meaningful
//! failure messages than a bare `assert_eq!`.

use core_kernel::Money;
use domain_billing::{Outstanding, Payment};

/// Asserts that each payment's accumulated total is its predecessor's
/// total plus its own amount, starting from zero
///
/// # Panics
///
/// Panics at the first payment that breaks the chain
pub fn assert_accumulation_chain(payments: &[Payment]) {
    let mut running = Money::ZERO;
    for (index, payment) in payments.iter().enumerate() {
        running = running
            .checked_add(payment.amount)
            .expect("accumulated total overflowed");
        assert_eq!(
            payment.amount_accumulated, running,
            "Payment #{} ({}) has accumulated total {}, expected {}",
            index, payment.id, payment.amount_accumulated, running
        );
    }
}

/// Asserts that every payment equals the given installment
pub fn assert_all_installments(payments: &[Payment], installment: Money) {
    for payment in payments {
        assert_eq!(
            payment.amount, installment,
            "Payment {} has amount {}, expected installment {}",
            payment.id, payment.amount, installment
        );
    }
}

/// Asserts the paid and outstanding amounts of a balance
pub fn assert_outstanding(outstanding: &Outstanding, expected_paid: Money) {
    assert_eq!(
        outstanding.paid, expected_paid,
        "Expected paid {}, got {}",
        expected_paid, outstanding.paid
    );
    assert_eq!(
        outstanding.outstanding,
        outstanding.bill.saturating_sub(expected_paid),
        "Outstanding {} does not equal bill {} minus paid {}",
        outstanding.outstanding,
        outstanding.bill,
        expected_paid
    );
}
