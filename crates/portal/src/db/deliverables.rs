//! Deliverable repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use atelier_core::{DeliverableId, DeliverableStatus, ProjectId};

use super::RepositoryError;
use crate::models::Deliverable;

#[derive(Debug, sqlx::FromRow)]
struct DeliverableRow {
    id: i32,
    project_id: i32,
    title: String,
    status: DeliverableStatus,
    due_on: Option<NaiveDate>,
    file_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DeliverableRow> for Deliverable {
    fn from(row: DeliverableRow) -> Self {
        Self {
            id: DeliverableId::new(row.id),
            project_id: ProjectId::new(row.project_id),
            title: row.title,
            status: row.status,
            due_on: row.due_on,
            file_url: row.file_url,
            created_at: row.created_at,
        }
    }
}

const DELIVERABLE_COLUMNS: &str = "id, project_id, title, status, due_on, file_url, created_at";

/// Repository for deliverable database operations.
pub struct DeliverableRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DeliverableRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List deliverables for a project, due-date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Deliverable>, RepositoryError> {
        let rows: Vec<DeliverableRow> = sqlx::query_as(&format!(
            "SELECT {DELIVERABLE_COLUMNS} FROM portal.deliverables
             WHERE project_id = $1 ORDER BY due_on NULLS LAST, id"
        ))
        .bind(project_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a deliverable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        project_id: ProjectId,
        title: &str,
        due_on: Option<NaiveDate>,
        file_url: Option<&str>,
    ) -> Result<Deliverable, RepositoryError> {
        let row: DeliverableRow = sqlx::query_as(&format!(
            "INSERT INTO portal.deliverables (project_id, title, due_on, file_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {DELIVERABLE_COLUMNS}"
        ))
        .bind(project_id.as_i32())
        .bind(title)
        .bind(due_on)
        .bind(file_url)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a deliverable's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no deliverable has this id.
    pub async fn update_status(
        &self,
        id: DeliverableId,
        status: DeliverableStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE portal.deliverables SET status = $2 WHERE id = $1")
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
