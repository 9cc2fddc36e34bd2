//! Repository implementations
//!
//! Repositories own the SQL and map between database rows and plain row
//! structs. Conversion to domain types happens in the adapters.

pub mod billing;

pub use billing::{BillableRow, BillingRepository, PaymentRow};
