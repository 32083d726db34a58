//! Project repository.
//!
//! Catalog queries always join the owning client's summary so downstream
//! consumers never issue a second lookup per project. Ordering is stable:
//! `created_at ASC, id ASC`, so identical inputs always produce an
//! identically ordered catalog.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use atelier_core::{ClientId, Environment, ProjectId, ProjectStatus};

use super::RepositoryError;
use crate::models::{CatalogProject, ClientSummary, Project};

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    name: String,
    status: ProjectStatus,
    progress_percentage: i16,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    environment: Environment,
    client_id: i32,
    roi_config: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::new(row.id),
            name: row.name,
            status: row.status,
            progress_percentage: row.progress_percentage,
            start_date: row.start_date,
            end_date: row.end_date,
            environment: row.environment,
            client_id: ClientId::new(row.client_id),
            roi_config: row.roi_config,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Project row with the owning client's summary pre-joined.
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    company_name: String,
    logo_url: Option<String>,
}

impl From<CatalogRow> for CatalogProject {
    fn from(row: CatalogRow) -> Self {
        Self {
            project: row.project.into(),
            client: ClientSummary {
                company_name: row.company_name,
                logo_url: row.logo_url,
            },
        }
    }
}

const CATALOG_SELECT: &str = "SELECT p.id, p.name, p.status, p.progress_percentage,
        p.start_date, p.end_date, p.environment, p.client_id, p.roi_config,
        p.created_at, p.updated_at,
        c.company_name, c.logo_url
 FROM portal.projects p
 JOIN portal.clients c ON c.id = p.client_id";

const CATALOG_ORDER: &str = " ORDER BY p.created_at, p.id";

/// Repository for project database operations.
pub struct ProjectRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all projects with client summaries, in stable catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CatalogProject>, RepositoryError> {
        let rows: Vec<CatalogRow> = sqlx::query_as(&format!("{CATALOG_SELECT}{CATALOG_ORDER}"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List projects owned by one client company, in stable catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_owned_by(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<CatalogProject>, RepositoryError> {
        let rows: Vec<CatalogRow> =
            sqlx::query_as(&format!("{CATALOG_SELECT} WHERE p.client_id = $1{CATALOG_ORDER}"))
                .bind(client_id.as_i32())
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one project with its client summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: ProjectId,
    ) -> Result<Option<CatalogProject>, RepositoryError> {
        let row: Option<CatalogRow> =
            sqlx::query_as(&format!("{CATALOG_SELECT} WHERE p.id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// The most recently updated projects, for the admin overview.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recently_updated(
        &self,
        limit: i64,
    ) -> Result<Vec<CatalogProject>, RepositoryError> {
        let rows: Vec<CatalogRow> =
            sqlx::query_as(&format!("{CATALOG_SELECT} ORDER BY p.updated_at DESC LIMIT $1"))
                .bind(limit)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a project for a client company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        name: &str,
        client_id: ClientId,
        environment: Environment,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Project, RepositoryError> {
        let row: ProjectRow = sqlx::query_as(
            "INSERT INTO portal.projects (name, client_id, environment, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, status, progress_percentage, start_date, end_date,
                       environment, client_id, roi_config, created_at, updated_at",
        )
        .bind(name)
        .bind(client_id.as_i32())
        .bind(environment)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a project's status and progress.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no project has this id.
    pub async fn update_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
        progress_percentage: i16,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE portal.projects
             SET status = $2, progress_percentage = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(status)
        .bind(progress_percentage.clamp(0, 100))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no project has this id.
    pub async fn delete(&self, id: ProjectId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.projects WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all projects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portal.projects")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
