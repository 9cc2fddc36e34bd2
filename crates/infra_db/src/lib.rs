//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the billing engine using SQLx.
//!
//! # Layout
//!
//! - `pool`: connection pool configuration and embedded migrations
//! - `repositories`: SQL access returning plain row structs
//! - `adapters`: the `LedgerStore` port implemented over the repositories
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
pub use adapters::PostgresLedgerStore;
