//! Project selection route and the shared project-switcher view model.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use atelier_core::ProjectId;
use atelier_core::guard::CLIENT_ROOT;

use crate::error::AppError;
use crate::middleware::identity::RequireUser;
use crate::scope::{ProjectScope, switch_project};
use crate::state::AppState;

/// One option in the project switcher.
pub struct ProjectOptionView {
    pub id: i32,
    pub name: String,
    pub company: String,
    pub selected: bool,
}

/// Build the switcher options for the current scope.
///
/// Every project in the caller's catalog appears; the active one is marked.
#[must_use]
pub fn switcher_options(scope: &ProjectScope) -> Vec<ProjectOptionView> {
    let active = scope.active_project().map(crate::models::CatalogProject::id);
    scope
        .catalog
        .projects
        .iter()
        .map(|p| ProjectOptionView {
            id: p.id().as_i32(),
            name: p.project.name.clone(),
            company: p.client.company_name.clone(),
            selected: active == Some(p.id()),
        })
        .collect()
}

/// Selection form data. An absent or empty `project_id` clears the
/// selection.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    #[serde(default, deserialize_with = "crate::routes::empty_string_as_none")]
    pub project_id: Option<i32>,
    /// Where to return to after switching.
    pub return_to: Option<String>,
}

/// Handle an explicit project switch.
///
/// Switching to a project outside the caller's catalog is silently refused
/// and the previous selection survives.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn select(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(form): Form<SelectForm>,
) -> Result<Response, AppError> {
    let selection = form.project_id.map(ProjectId::new);
    switch_project(&state, &session, &user, selection).await?;

    // Only same-site relative paths are honoured as return targets.
    let destination = form
        .return_to
        .filter(|p| p.starts_with('/') && !p.starts_with("//"))
        .unwrap_or_else(|| CLIENT_ROOT.to_string());
    Ok(Redirect::to(&destination).into_response())
}
