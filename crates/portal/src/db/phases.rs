//! Phase repository.

use chrono::NaiveDate;
use sqlx::PgPool;

use atelier_core::{PhaseId, PhaseStatus, ProjectId};

use super::RepositoryError;
use crate::models::Phase;

#[derive(Debug, sqlx::FromRow)]
struct PhaseRow {
    id: i32,
    project_id: i32,
    name: String,
    status: PhaseStatus,
    position: i32,
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
}

impl From<PhaseRow> for Phase {
    fn from(row: PhaseRow) -> Self {
        Self {
            id: PhaseId::new(row.id),
            project_id: ProjectId::new(row.project_id),
            name: row.name,
            status: row.status,
            position: row.position,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
        }
    }
}

const PHASE_COLUMNS: &str = "id, project_id, name, status, position, starts_on, ends_on";

/// Repository for project-phase database operations.
pub struct PhaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PhaseRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List phases for a project, in position order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Phase>, RepositoryError> {
        let rows: Vec<PhaseRow> = sqlx::query_as(&format!(
            "SELECT {PHASE_COLUMNS} FROM portal.phases
             WHERE project_id = $1 ORDER BY position, id"
        ))
        .bind(project_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a phase at the end of a project's phase list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        project_id: ProjectId,
        name: &str,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Phase, RepositoryError> {
        let row: PhaseRow = sqlx::query_as(&format!(
            "INSERT INTO portal.phases (project_id, name, position, starts_on, ends_on)
             VALUES ($1, $2,
                     (SELECT COALESCE(MAX(position), 0) + 1 FROM portal.phases WHERE project_id = $1),
                     $3, $4)
             RETURNING {PHASE_COLUMNS}"
        ))
        .bind(project_id.as_i32())
        .bind(name)
        .bind(starts_on)
        .bind(ends_on)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a phase's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no phase has this id.
    pub async fn update_status(
        &self,
        id: PhaseId,
        status: PhaseStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE portal.phases SET status = $2 WHERE id = $1")
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
