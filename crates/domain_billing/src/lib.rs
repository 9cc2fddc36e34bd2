//! Billing Domain - Installment Loan Billing
//!
//! This crate implements the billing rules for flat-interest installment
//! loans ("billables"), repaid in fixed weekly installments.
//!
//! # Rules
//!
//! - The total payable amount is `ceil(principal * (1 + rate))`, fixed at creation
//! - Each payment must equal exactly `floor(amount / duration_weeks)`
//! - The ledger is append-only; every payment carries the running total
//! - Outstanding and delinquency are derived on demand, never stored
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingEngine, EngineConfig};
//! use domain_billing::ports::memory::InMemoryLedgerStore;
//!
//! let engine = BillingEngine::new(
//!     Arc::new(InMemoryLedgerStore::new()),
//!     Arc::new(SystemClock),
//!     EngineConfig::default(),
//! )?;
//!
//! let loan = engine.create_billable(BillableId::new("loan-1"), Money::from_minor(5_000_000)).await?;
//! engine.record_payment(&loan.id, loan.weekly_installment(), Utc::now()).await?;
//!
//! if engine.is_delinquent(&loan.id).await? {
//!     // notify collections
//! }
//! ```

pub mod billable;
pub mod payment;
pub mod outstanding;
pub mod delinquency;
pub mod ports;
pub mod engine;
pub mod error;

pub use billable::{Billable, LoanTerms};
pub use payment::{Payment, PendingPayment};
pub use outstanding::Outstanding;
pub use delinquency::DelinquencyAssessment;
pub use ports::LedgerStore;
pub use engine::{BillingEngine, EngineConfig};
pub use error::BillingError;
