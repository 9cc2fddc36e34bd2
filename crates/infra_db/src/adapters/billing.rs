//! PostgreSQL Ledger Store
//!
//! Implements the billing domain's `LedgerStore` port over the
//! `BillingRepository`.
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
//! - Connection and pool errors -> `PortError::Connection`
//! - Decode errors -> `PortError::Transformation`
//! - Other errors -> `PortError::Internal`

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, BillableId, DomainPort, HealthCheckResult, HealthCheckable, Money, PaymentId,
    PortError,
};
use domain_billing::{Billable, LedgerStore, Payment, PendingPayment};

use crate::error::DatabaseError;
use crate::repositories::billing::{BillableRow, BillingRepository, PaymentRow};

/// PostgreSQL-backed implementation of the LedgerStore port
///
/// Appends take a `SELECT ... FOR UPDATE` lock on the billable row, so
/// payments against one billable are serialized while different billables
/// proceed in parallel.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new store over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &BillingRepository {
        &self.repository
    }

    async fn ensure_exists(&self, id: &BillableId) -> Result<(), PortError> {
        let exists = self
            .repository
            .billable_exists(id.as_str())
            .await
            .map_err(db_to_port_error)?;
        if exists {
            Ok(())
        } else {
            Err(PortError::not_found("Billable", id))
        }
    }
}

impl DomainPort for PostgresLedgerStore {}

#[async_trait]
impl HealthCheckable for PostgresLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: "postgres-ledger-store".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, billable), fields(billable_id = %billable.id))]
    async fn insert_billable(&self, billable: &Billable) -> Result<(), PortError> {
        let row = billable_to_row(billable)?;
        let inserted = self
            .repository
            .insert_billable(&row)
            .await
            .map_err(db_to_port_error)?;

        if !inserted {
            return Err(PortError::conflict(format!(
                "billable {} already exists",
                billable.id
            )));
        }
        debug!("Billable row inserted");
        Ok(())
    }

    #[instrument(skip(self), fields(billable_id = %id))]
    async fn get_billable(&self, id: &BillableId) -> Result<Billable, PortError> {
        self.repository
            .get_billable(id.as_str())
            .await
            .map_err(db_to_port_error)?
            .ok_or_else(|| PortError::not_found("Billable", id))
            .and_then(row_to_billable)
    }

    #[instrument(skip(self, payment), fields(billable_id = %payment.billable_id, payment_id = %payment.id))]
    async fn append_payment(&self, payment: PendingPayment) -> Result<Payment, PortError> {
        let billable_id = payment.billable_id.clone();

        let row = self
            .repository
            .append_payment(billable_id.as_str(), move |prior| {
                payment
                    .post(Money::from_minor(prior))
                    .map(|posted| payment_to_row(&posted))
                    .map_err(|e| {
                        DatabaseError::ConstraintViolation(format!("cannot accumulate payment: {}", e))
                    })
            })
            .await
            .map_err(db_to_port_error)?;

        debug!(amount_accumulated = row.amount_accumulated, "Payment row inserted");
        Ok(row_to_payment(row))
    }

    #[instrument(skip(self), fields(billable_id = %id))]
    async fn latest_payment(&self, id: &BillableId) -> Result<Option<Payment>, PortError> {
        let row = self
            .repository
            .latest_payment(id.as_str())
            .await
            .map_err(db_to_port_error)?;

        match row {
            Some(row) => Ok(Some(row_to_payment(row))),
            None => {
                self.ensure_exists(id).await?;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(billable_id = %id))]
    async fn list_payments(&self, id: &BillableId) -> Result<Vec<Payment>, PortError> {
        let rows = self
            .repository
            .list_payments(id.as_str())
            .await
            .map_err(db_to_port_error)?;

        if rows.is_empty() {
            self.ensure_exists(id).await?;
        }
        Ok(rows.into_iter().map(row_to_payment).collect())
    }
}

/// Converts a database error to a port error
fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
        DatabaseError::DuplicateEntry(msg) => PortError::conflict(msg),
        DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        DatabaseError::Decode(msg) => PortError::transformation(msg),
        other => PortError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn billable_to_row(billable: &Billable) -> Result<BillableRow, PortError> {
    let duration_weeks = i32::try_from(billable.duration_weeks).map_err(|_| {
        PortError::transformation(format!(
            "duration of {} weeks does not fit the schema",
            billable.duration_weeks
        ))
    })?;

    Ok(BillableRow {
        billable_id: billable.id.as_str().to_string(),
        principal: billable.principal.minor_units(),
        amount: billable.amount.minor_units(),
        duration_weeks,
        created_at: billable.created_at,
        due_at: billable.due_at,
    })
}

fn row_to_billable(row: BillableRow) -> Result<Billable, PortError> {
    let duration_weeks = u32::try_from(row.duration_weeks).map_err(|_| {
        PortError::transformation(format!(
            "billable {} has invalid duration {}",
            row.billable_id, row.duration_weeks
        ))
    })?;

    Ok(Billable {
        id: BillableId::new(row.billable_id),
        principal: Money::from_minor(row.principal),
        amount: Money::from_minor(row.amount),
        duration_weeks,
        created_at: row.created_at,
        due_at: row.due_at,
    })
}

fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        payment_id: *payment.id.as_uuid(),
        billable_id: payment.billable_id.as_str().to_string(),
        amount: payment.amount.minor_units(),
        amount_accumulated: payment.amount_accumulated.minor_units(),
        paid_at: payment.paid_at,
        created_at: payment.created_at,
    }
}

fn row_to_payment(row: PaymentRow) -> Payment {
    Payment {
        id: PaymentId::from_uuid(row.payment_id),
        billable_id: BillableId::new(row.billable_id),
        amount: Money::from_minor(row.amount),
        amount_accumulated: Money::from_minor(row.amount_accumulated),
        paid_at: row.paid_at,
        created_at: row.created_at,
    }
}
