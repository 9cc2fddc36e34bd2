//! Domain Adapters
//!
//! Implementations of domain ports on top of the PostgreSQL repositories.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerStore;
//! use domain_billing::LedgerStore;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(PostgresLedgerStore::new(pool));
//! ```

pub mod billing;

pub use billing::PostgresLedgerStore;
