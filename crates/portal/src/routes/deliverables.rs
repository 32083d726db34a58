//! Deliverables route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::db::DeliverableRepository;
use crate::error::AppError;
use crate::filters;
use crate::models::Deliverable;
use crate::routes::projects::{ProjectOptionView, switcher_options};
use crate::scope::ProjectScope;
use crate::state::AppState;

/// Deliverables page template.
#[derive(Template, WebTemplate)]
#[template(path = "deliverables.html")]
pub struct DeliverablesTemplate {
    pub user_name: String,
    pub is_staff: bool,
    pub switcher: Vec<ProjectOptionView>,
    pub has_project: bool,
    pub project_name: String,
    pub deliverables: Vec<Deliverable>,
}

/// List the deliverables of the active project.
///
/// # Errors
///
/// Returns an error if the deliverables query fails.
pub async fn index(
    axum::extract::State(state): axum::extract::State<AppState>,
    scope: ProjectScope,
) -> Result<impl IntoResponse, AppError> {
    let mut template = DeliverablesTemplate {
        user_name: scope.user.name.clone(),
        is_staff: scope.user.role.is_staff(),
        switcher: switcher_options(&scope),
        has_project: false,
        project_name: String::new(),
        deliverables: Vec::new(),
    };

    if let Some(project) = scope.active_project() {
        template.has_project = true;
        template.project_name = project.project.name.clone();
        template.deliverables = DeliverableRepository::new(state.pool())
            .list_for_project(project.id())
            .await?;
    }

    Ok(template)
}
