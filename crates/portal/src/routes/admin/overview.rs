//! Admin overview route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::db::{ClientRepository, ProjectRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::identity::RequireUser;
use crate::models::CatalogProject;
use crate::state::AppState;

/// How many recently-updated projects the overview lists.
const RECENT_LIMIT: i64 = 8;

/// Admin overview template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/overview.html")]
pub struct OverviewTemplate {
    pub user_name: String,
    pub is_admin: bool,
    pub client_count: i64,
    pub project_count: i64,
    pub recent: Vec<CatalogProject>,
}

/// Display the admin overview: counts plus recent activity.
///
/// # Errors
///
/// Returns an error if a count or listing query fails.
pub async fn show(
    axum::extract::State(state): axum::extract::State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let projects = ProjectRepository::new(state.pool());
    let clients = ClientRepository::new(state.pool());

    Ok(OverviewTemplate {
        is_admin: user.role == atelier_core::Role::Admin,
        user_name: user.name,
        client_count: clients.count().await?,
        project_count: projects.count().await?,
        recent: projects.recently_updated(RECENT_LIMIT).await?,
    })
}
