//! User management commands.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use atelier_core::Role;

use super::{CliError, connect};

/// Minimum password length accepted at creation.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Create a new portal user.
///
/// Client users must name a client company; staff users must not.
///
/// # Errors
///
/// Returns `CliError` on invalid input, an existing email, or a database
/// failure.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    client_id: Option<i32>,
    password: &str,
) -> Result<i32, CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;

    if !email.contains('@') || !email.contains('.') {
        return Err(CliError::InvalidInput(format!("invalid email: {email}")));
    }
    match (role, client_id) {
        (Role::Client, None) => {
            return Err(CliError::InvalidInput(
                "client users require --client-id".to_owned(),
            ));
        }
        (Role::Admin | Role::Team, Some(_)) => {
            return Err(CliError::InvalidInput(
                "staff users must not have --client-id".to_owned(),
            ));
        }
        _ => {}
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CliError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let pool = connect().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM portal.users WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(CliError::UserExists(email.to_owned()));
    }

    let password_hash = hash_password(password)?;

    tracing::info!("Creating user: {} ({})", email, role);
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO portal.users (email, name, role, client_id, password_hash)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(email)
    .bind(name)
    .bind(role)
    .bind(client_id)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    Ok(id)
}

/// Hash a password with Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, CliError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CliError::InvalidInput(format!("password hashing failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    #[test]
    fn test_hash_password_is_verifiable() {
        let hash = hash_password("correct horse battery").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse battery", &parsed)
                .is_ok()
        );
    }
}
