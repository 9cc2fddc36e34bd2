//! Billing ledger repository
//!
//! Row-level access to the `billables` and `payments` tables. Queries are
//! checked at runtime so the crate builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// A row of the `billables` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BillableRow {
    pub billable_id: String,
    pub principal: i64,
    pub amount: i64,
    pub duration_weeks: i32,
    pub created_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

/// A row of the `payments` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub billable_id: String,
    pub amount: i64,
    pub amount_accumulated: i64,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Repository for billables and their payment ledgers
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Creates a new BillingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a billable unless one with the same id exists
    ///
    /// # Returns
    ///
    /// `true` if the row was inserted, `false` if the id was already taken
    pub async fn insert_billable(&self, row: &BillableRow) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO billables (
                billable_id, principal, amount, duration_weeks, created_at, due_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (billable_id) DO NOTHING
            "#,
        )
        .bind(&row.billable_id)
        .bind(row.principal)
        .bind(row.amount)
        .bind(row.duration_weeks)
        .bind(row.created_at)
        .bind(row.due_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Retrieves a billable by id
    pub async fn get_billable(&self, billable_id: &str) -> Result<Option<BillableRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BillableRow>(
            r#"
            SELECT billable_id, principal, amount, duration_weeks, created_at, due_at
            FROM billables
            WHERE billable_id = $1
            "#,
        )
        .bind(billable_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Returns true if a billable with this id exists
    pub async fn billable_exists(&self, billable_id: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM billables WHERE billable_id = $1)",
        )
        .bind(billable_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Appends a payment while holding a row lock on its billable
    ///
    /// Inside one transaction: locks the billable row, reads the latest
    /// accumulated total (zero for an empty ledger), asks `build` for the
    /// row to insert, and inserts it. Concurrent appends to the same
    /// billable queue on the row lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the billable does not exist, or
    /// whatever `build` returns
    pub async fn append_payment<F>(
        &self,
        billable_id: &str,
        build: F,
    ) -> Result<PaymentRow, DatabaseError>
    where
        F: FnOnce(i64) -> Result<PaymentRow, DatabaseError> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, String>(
            "SELECT billable_id FROM billables WHERE billable_id = $1 FOR UPDATE",
        )
        .bind(billable_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(DatabaseError::not_found("Billable", billable_id));
        }

        let prior = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT amount_accumulated
            FROM payments
            WHERE billable_id = $1
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .bind(billable_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        let row = build(prior)?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, billable_id, amount, amount_accumulated, paid_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.payment_id)
        .bind(&row.billable_id)
        .bind(row.amount)
        .bind(row.amount_accumulated)
        .bind(row.paid_at)
        .bind(row.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Retrieves the most recently appended payment for a billable
    pub async fn latest_payment(&self, billable_id: &str) -> Result<Option<PaymentRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, billable_id, amount, amount_accumulated, paid_at, created_at
            FROM payments
            WHERE billable_id = $1
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .bind(billable_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves all payments for a billable in insertion order
    pub async fn list_payments(&self, billable_id: &str) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, billable_id, amount, amount_accumulated, paid_at, created_at
            FROM payments
            WHERE billable_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(billable_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
