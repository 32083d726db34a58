//! Admin team and user management.
//!
//! Creating users and removing them is admin-only (the router declares the
//! role). Assignment management lives here too: assignments drive the
//! `?mine=1` narrowing for staff, and nothing else - a team member without
//! assignments still sees the full catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use atelier_core::{ClientId, Email, ProjectId, Role, UserId};

use crate::db::{ClientRepository, RepositoryError, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::identity::RequireUser;
use crate::models::{Client, User};
use crate::routes::empty_string_as_none;
use crate::services::auth::{hash_password, validate_password};
use crate::state::AppState;

/// Team page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/team.html")]
pub struct TeamTemplate {
    pub user_name: String,
    pub users: Vec<User>,
    pub clients: Vec<Client>,
    pub error: Option<String>,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// New-user form data. `client_id` is required for (and only valid for)
/// client users.
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub client_id: Option<i32>,
    pub password: String,
}

/// List all users.
///
/// # Errors
///
/// Returns an error if the listing query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(TeamTemplate {
        user_name: user.name,
        users: UserRepository::new(state.pool()).list_all().await?,
        clients: ClientRepository::new(state.pool()).list_all().await?,
        error: query.error,
    })
}

/// Create a user.
///
/// Client users must name their company; staff users must not. Getting
/// this wrong at creation time would silently give the user an empty (or
/// an unscoped) catalog later, so it is rejected here.
///
/// # Errors
///
/// Returns an error if the insert fails for a non-conflict reason.
pub async fn create_user(
    State(state): State<AppState>,
    RequireUser(_admin): RequireUser,
    Form(form): Form<NewUserForm>,
) -> Result<Response, AppError> {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => {
            return Ok(Redirect::to("/admin/team?error=Invalid+email+address").into_response());
        }
    };

    let client_id = form.client_id.map(ClientId::new);
    match (form.role, client_id) {
        (Role::Client, None) => {
            return Ok(
                Redirect::to("/admin/team?error=Client+users+need+a+company").into_response(),
            );
        }
        (Role::Admin | Role::Team, Some(_)) => {
            return Ok(
                Redirect::to("/admin/team?error=Staff+users+cannot+belong+to+a+company")
                    .into_response(),
            );
        }
        _ => {}
    }

    if validate_password(&form.password).is_err() {
        return Ok(Redirect::to("/admin/team?error=Password+too+short").into_response());
    }
    let password_hash = hash_password(&form.password)?;

    let result = UserRepository::new(state.pool())
        .create(&email, form.name.trim(), form.role, client_id, &password_hash)
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "user created");
            Ok(Redirect::to("/admin/team").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/admin/team?error=Email+already+registered").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a user. Self-deletion is refused.
///
/// # Errors
///
/// Returns an error if the user does not exist.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUser(admin): RequireUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let id = UserId::new(id);
    if id == admin.id {
        return Err(AppError::BadRequest("cannot delete your own account".to_string()));
    }

    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(Redirect::to("/admin/team").into_response())
}

/// Assignment form data.
#[derive(Debug, Deserialize)]
pub struct AssignmentForm {
    pub user_id: i32,
    pub project_id: i32,
}

/// Assign a staff user to a project. Idempotent; assigning a client user
/// is rejected since client scope comes from company ownership.
///
/// # Errors
///
/// Returns an error if the user does not exist or the insert fails.
pub async fn assign(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Form(form): Form<AssignmentForm>,
) -> Result<Response, AppError> {
    let users = UserRepository::new(state.pool());
    let target = users
        .get_by_id(UserId::new(form.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", form.user_id)))?;

    if !target.role.is_staff() {
        return Err(AppError::BadRequest(
            "client users are scoped by company, not by assignment".to_string(),
        ));
    }

    users
        .assign(target.id, ProjectId::new(form.project_id))
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{}", form.project_id)).into_response())
}

/// Remove an assignment.
///
/// # Errors
///
/// Returns an error if the assignment does not exist.
pub async fn unassign(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Form(form): Form<AssignmentForm>,
) -> Result<Response, AppError> {
    UserRepository::new(state.pool())
        .unassign(UserId::new(form.user_id), ProjectId::new(form.project_id))
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{}", form.project_id)).into_response())
}
