//! Demo data seeding.
//!
//! Creates two client companies with one user each, a couple of staff
//! users, and projects with phases, deliverables, and payments. Intended
//! for local development; every account's password is `atelier-demo`.

use chrono::{Duration, Utc};

use super::{CliError, connect, user::hash_password};

const DEMO_PASSWORD: &str = "atelier-demo";

/// Seed the database with demo data.
///
/// Refuses to run if any user already exists, so it cannot trample a real
/// installation.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portal.users")
        .fetch_one(&pool)
        .await?;
    if users > 0 {
        return Err(CliError::InvalidInput(
            "database already has users; refusing to seed".to_owned(),
        ));
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;
    let today = Utc::now().date_naive();

    let mut tx = pool.begin().await?;

    let northwind: i32 = sqlx::query_scalar(
        "INSERT INTO portal.clients (company_name, contact_email)
         VALUES ('Northwind Coffee', 'hello@northwind.example') RETURNING id",
    )
    .fetch_one(&mut *tx)
    .await?;

    let helix: i32 = sqlx::query_scalar(
        "INSERT INTO portal.clients (company_name, contact_email)
         VALUES ('Helix Outdoor', 'team@helix.example') RETURNING id",
    )
    .fetch_one(&mut *tx)
    .await?;

    // Staff
    sqlx::query(
        "INSERT INTO portal.users (email, name, role, password_hash) VALUES
         ('ada@atelier.example', 'Ada', 'admin', $1),
         ('tom@atelier.example', 'Tom', 'team', $1)",
    )
    .bind(&password_hash)
    .execute(&mut *tx)
    .await?;

    // One client user per company
    sqlx::query(
        "INSERT INTO portal.users (email, name, role, client_id, password_hash) VALUES
         ('max@northwind.example', 'Max', 'client', $1, $3),
         ('lena@helix.example', 'Lena', 'client', $2, $3)",
    )
    .bind(northwind)
    .bind(helix)
    .bind(&password_hash)
    .execute(&mut *tx)
    .await?;

    let rebrand: i32 = sqlx::query_scalar(
        "INSERT INTO portal.projects (name, client_id, environment, status,
                                      progress_percentage, start_date, end_date)
         VALUES ('Brand refresh', $1, 'production', 'active', 40, $2, $3)
         RETURNING id",
    )
    .bind(northwind)
    .bind(today - Duration::days(30))
    .bind(today + Duration::days(60))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO portal.projects (name, client_id, environment)
         VALUES ('Retainer 2026', $1, 'test'), ('Launch site', $2, 'test')",
    )
    .bind(northwind)
    .bind(helix)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO portal.phases (project_id, name, status, position, starts_on, ends_on) VALUES
         ($1, 'Discovery', 'completed', 1, $2, $3),
         ($1, 'Design', 'in_progress', 2, $3, $4),
         ($1, 'Rollout', 'pending', 3, $4, $5)",
    )
    .bind(rebrand)
    .bind(today - Duration::days(30))
    .bind(today - Duration::days(10))
    .bind(today + Duration::days(20))
    .bind(today + Duration::days(60))
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO portal.deliverables (project_id, title, status, due_on) VALUES
         ($1, 'Logo exploration', 'delivered', $2),
         ($1, 'Brand guidelines', 'in_review', $3)",
    )
    .bind(rebrand)
    .bind(today - Duration::days(5))
    .bind(today + Duration::days(14))
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO portal.payments (project_id, description, amount, status, due_on, paid_at) VALUES
         ($1, 'Deposit', 2500.00, 'paid', $2, now()),
         ($1, 'Milestone 2', 2500.00, 'due', $3, NULL)",
    )
    .bind(rebrand)
    .bind(today - Duration::days(25))
    .bind(today + Duration::days(30))
    .execute(&mut *tx)
    .await?;

    // Tom works on the rebrand
    sqlx::query(
        "INSERT INTO portal.assignments (user_id, project_id)
         SELECT id, $1 FROM portal.users WHERE email = 'tom@atelier.example'",
    )
    .bind(rebrand)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Seed complete. All demo passwords are '{DEMO_PASSWORD}'.");
    Ok(())
}
