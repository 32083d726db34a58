//! Client-company repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use atelier_core::ClientId;

use super::{RepositoryError, map_write_error};
use crate::models::Client;

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: i32,
    company_name: String,
    logo_url: Option<String>,
    contact_email: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::new(row.id),
            company_name: row.company_name,
            logo_url: row.logo_url,
            contact_email: row.contact_email,
            created_at: row.created_at,
        }
    }
}

/// Repository for client-company database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all client companies, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, company_name, logo_url, contact_email, created_at
             FROM portal.clients ORDER BY company_name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one client company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row: Option<ClientRow> = sqlx::query_as(
            "SELECT id, company_name, logo_url, contact_email, created_at
             FROM portal.clients WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a client company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the company name is taken.
    pub async fn create(
        &self,
        company_name: &str,
        logo_url: Option<&str>,
        contact_email: Option<&str>,
    ) -> Result<Client, RepositoryError> {
        let row: ClientRow = sqlx::query_as(
            "INSERT INTO portal.clients (company_name, logo_url, contact_email)
             VALUES ($1, $2, $3)
             RETURNING id, company_name, logo_url, contact_email, created_at",
        )
        .bind(company_name)
        .bind(logo_url)
        .bind(contact_email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "company name already exists"))?;

        Ok(row.into())
    }

    /// Delete a client company (cascades to its projects).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no client has this id.
    pub async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM portal.clients WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all client companies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portal.clients")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
