//! Billing Domain Ports
//!
//! This module defines the storage port the billing engine needs. The engine
//! only ever talks to `Arc<dyn LedgerStore>`, so the backing store can be
//! swapped without touching business rules.
//!
//! # Adapters
//!
//! - **PostgreSQL**: `infra_db::adapters::PostgresLedgerStore`
//! - **In-memory**: [`memory::InMemoryLedgerStore`], behind the `in-memory`
//!   feature, for tests and local runs without a database
//!
//! # Concurrency
//!
//! Payments against the same billable must be serialized so that every
//! payment's accumulated total is its predecessor's total plus its own
//! amount. Adapters provide that serialization point and call
//! [`PendingPayment::post`] inside it; the arithmetic itself lives in the
//! domain. Payments against different billables may proceed in parallel.

use async_trait::async_trait;

use core_kernel::{BillableId, DomainPort, HealthCheckable, PortError};

use crate::billable::Billable;
use crate::payment::{PendingPayment, Payment};

/// Persistence port for billables and their payment ledgers
#[async_trait]
pub trait LedgerStore: DomainPort + HealthCheckable {
    /// Stores a new billable
    ///
    /// # Returns
    ///
    /// `PortError::Conflict` if a billable with the same id already exists
    async fn insert_billable(&self, billable: &Billable) -> Result<(), PortError>;

    /// Retrieves a billable by id
    ///
    /// # Returns
    ///
    /// The billable if found, or `PortError::NotFound`
    async fn get_billable(&self, id: &BillableId) -> Result<Billable, PortError>;

    /// Appends a payment to the billable's ledger
    ///
    /// The adapter locks the billable's ledger, reads the latest accumulated
    /// total, posts the pending payment on top of it and persists the result
    /// before releasing the lock.
    ///
    /// # Returns
    ///
    /// The stored payment, or `PortError::NotFound` if the billable is unknown
    async fn append_payment(&self, payment: PendingPayment) -> Result<Payment, PortError>;

    /// Returns the most recently appended payment, if any
    async fn latest_payment(&self, id: &BillableId) -> Result<Option<Payment>, PortError>;

    /// Returns every payment for the billable in insertion order
    async fn list_payments(&self, id: &BillableId) -> Result<Vec<Payment>, PortError>;
}

/// In-memory implementation of LedgerStore
///
/// Billables live in a map guarded by a read-write lock; each billable owns
/// its own ledger behind a mutex, which is the per-billable serialization
/// point for appends.
#[cfg(any(test, feature = "in-memory"))]
pub mod memory {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{Mutex, RwLock};

    #[derive(Debug)]
    struct LedgerEntry {
        billable: Billable,
        payments: Mutex<Vec<Payment>>,
    }

    /// In-memory ledger store
    #[derive(Debug, Default)]
    pub struct InMemoryLedgerStore {
        entries: RwLock<HashMap<BillableId, Arc<LedgerEntry>>>,
    }

    impl InMemoryLedgerStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored billables
        pub async fn billable_count(&self) -> usize {
            self.entries.read().await.len()
        }

        /// Number of payments recorded across all billables
        pub async fn payment_count(&self) -> usize {
            let entries: Vec<_> = self.entries.read().await.values().cloned().collect();
            let mut total = 0;
            for entry in entries {
                total += entry.payments.lock().await.len();
            }
            total
        }

        async fn entry(&self, id: &BillableId) -> Result<Arc<LedgerEntry>, PortError> {
            self.entries
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Billable", id))
        }
    }

    impl DomainPort for InMemoryLedgerStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryLedgerStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-ledger-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory store always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl LedgerStore for InMemoryLedgerStore {
        async fn insert_billable(&self, billable: &Billable) -> Result<(), PortError> {
            let mut entries = self.entries.write().await;
            if entries.contains_key(&billable.id) {
                return Err(PortError::conflict(format!(
                    "billable {} already exists",
                    billable.id
                )));
            }
            entries.insert(
                billable.id.clone(),
                Arc::new(LedgerEntry {
                    billable: billable.clone(),
                    payments: Mutex::new(Vec::new()),
                }),
            );
            Ok(())
        }

        async fn get_billable(&self, id: &BillableId) -> Result<Billable, PortError> {
            Ok(self.entry(id).await?.billable.clone())
        }

        async fn append_payment(&self, payment: PendingPayment) -> Result<Payment, PortError> {
            let entry = self.entry(&payment.billable_id).await?;
            let mut ledger = entry.payments.lock().await;

            let prior = crate::payment::accumulated_total(ledger.last());
            let posted = payment
                .post(prior)
                .map_err(|e| PortError::internal(format!("cannot accumulate payment: {}", e)))?;

            ledger.push(posted.clone());
            Ok(posted)
        }

        async fn latest_payment(&self, id: &BillableId) -> Result<Option<Payment>, PortError> {
            let entry = self.entry(id).await?;
            let ledger = entry.payments.lock().await;
            Ok(ledger.last().cloned())
        }

        async fn list_payments(&self, id: &BillableId) -> Result<Vec<Payment>, PortError> {
            let entry = self.entry(id).await?;
            let ledger = entry.payments.lock().await;
            Ok(ledger.clone())
        }
    }
}
