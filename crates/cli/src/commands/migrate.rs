//! Database migration command.
//!
//! Runs the portal's SQL migrations, then lets the session store create
//! its own table. Both are idempotent.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run portal database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../portal/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
