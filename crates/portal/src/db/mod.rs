//! Database operations for the portal `PostgreSQL` database.
//!
//! # Tables (schema `portal`)
//!
//! - `clients` - Client companies
//! - `users` - Portal users (admin, team, client)
//! - `projects` - Projects, each owned by one client company
//! - `assignments` - Staff-to-project assignment relation
//! - `phases` - Project phases
//! - `deliverables` - Project deliverables
//! - `payments` - Project payment lines
//! - `sessions` - Tower-sessions storage
//!
//! Queries use the runtime `query_as`/`query` API with explicit binds; row
//! structs plus `TryFrom` conversions keep database shapes separate from the
//! domain models.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/portal/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod clients;
pub mod deliverables;
pub mod payments;
pub mod phases;
pub mod projects;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use clients::ClientRepository;
pub use deliverables::DeliverableRepository;
pub use payments::PaymentRepository;
pub use phases::PhaseRepository;
pub use projects::ProjectRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map an insert/update error, converting unique violations to `Conflict`.
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(what.to_string())
        }
        _ => RepositoryError::Database(e),
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
