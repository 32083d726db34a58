//! Payment repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use atelier_core::{PaymentId, PaymentStatus, ProjectId};

use super::RepositoryError;
use crate::models::Payment;

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    project_id: i32,
    description: String,
    amount: Decimal,
    status: PaymentStatus,
    due_on: Option<NaiveDate>,
    paid_at: Option<DateTime<Utc>>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: PaymentId::new(row.id),
            project_id: ProjectId::new(row.project_id),
            description: row.description,
            amount: row.amount,
            status: row.status,
            due_on: row.due_on,
            paid_at: row.paid_at,
        }
    }
}

const PAYMENT_COLUMNS: &str = "id, project_id, description, amount, status, due_on, paid_at";

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List payments for a project, due-date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM portal.payments
             WHERE project_id = $1 ORDER BY due_on NULLS LAST, id"
        ))
        .bind(project_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a payment line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        project_id: ProjectId,
        description: &str,
        amount: Decimal,
        due_on: Option<NaiveDate>,
    ) -> Result<Payment, RepositoryError> {
        let row: PaymentRow = sqlx::query_as(&format!(
            "INSERT INTO portal.payments (project_id, description, amount, due_on)
             VALUES ($1, $2, $3, $4)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(project_id.as_i32())
        .bind(description)
        .bind(amount)
        .bind(due_on)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a payment's status, stamping `paid_at` when it becomes paid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no payment has this id.
    pub async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE portal.payments
             SET status = $2,
                 paid_at = CASE WHEN $2 = 'paid'::portal.payment_status THEN now() ELSE paid_at END
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
