//! Authentication route handlers.
//!
//! Password login against the portal's own user table. On success the
//! session id is cycled and the identity snapshot is written; the selected
//! project slot is deliberately left alone so a returning client lands on
//! the project they last had open.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use atelier_core::guard::{ADMIN_ROOT, CLIENT_ROOT, SIGN_IN_PATH};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::identity::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::scope::clear_selection;
use crate::services::AuthService;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate { error: query.error }
}

/// Handle login form submission.
///
/// Staff land on the admin overview; clients land on their dashboard.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn login(
    axum::extract::State(state): axum::extract::State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let user = match auth.login_with_password(&form.email, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(email = %form.email, error = %e, "login rejected");
            return Ok(
                Redirect::to(&format!("{SIGN_IN_PATH}?error=Invalid+email+or+password"))
                    .into_response(),
            );
        }
    };

    // New identity, new session id.
    session.cycle_id().await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(current.id.as_i32(), Some(current.email.as_str()));

    tracing::info!(user_id = %current.id, role = %current.role, "login succeeded");

    let destination = if current.role.is_staff() {
        ADMIN_ROOT
    } else {
        CLIENT_ROOT
    };
    Ok(Redirect::to(destination).into_response())
}

/// Handle logout.
///
/// Clears the identity and the selection slot, then cycles the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(session: Session) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    clear_selection(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();

    Ok(Redirect::to(SIGN_IN_PATH).into_response())
}
