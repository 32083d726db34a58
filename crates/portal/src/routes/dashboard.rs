//! Dashboard route handler.
//!
//! The main scope-consuming view. A client sees exactly their active
//! project: progress, phase breakdown, and what is coming up. Staff have no
//! selection handle and see the whole catalog instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};

use crate::db::{DeliverableRepository, PaymentRepository, PhaseRepository};
use crate::error::AppError;
use crate::filters;
use crate::models::{Deliverable, Payment, Phase};
use crate::routes::projects::{ProjectOptionView, switcher_options};
use crate::scope::ProjectScope;
use crate::state::AppState;

use atelier_core::{Environment, PaymentStatus, ProjectStatus};

/// How many upcoming items the dashboard shows per section.
const UPCOMING_LIMIT: usize = 5;

/// The active project, flattened for rendering.
pub struct ActiveProjectView {
    pub name: String,
    pub company: String,
    pub status: ProjectStatus,
    pub environment: Environment,
    pub progress: i16,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user_name: String,
    pub is_staff: bool,
    pub degraded: bool,
    pub switcher: Vec<ProjectOptionView>,
    pub active: Option<ActiveProjectView>,
    pub phases: Vec<Phase>,
    pub upcoming_deliverables: Vec<Deliverable>,
    pub upcoming_payments: Vec<Payment>,
}

/// Display the dashboard for the active project.
///
/// # Errors
///
/// Returns an error if a project-detail query fails. A failed catalog fetch
/// does not error: the scope arrives degraded and the page renders its
/// empty state.
pub async fn show(
    axum::extract::State(state): axum::extract::State<AppState>,
    scope: ProjectScope,
) -> Result<impl IntoResponse, AppError> {
    let mut template = DashboardTemplate {
        user_name: scope.user.name.clone(),
        is_staff: scope.user.role.is_staff(),
        degraded: scope.catalog.degraded,
        switcher: switcher_options(&scope),
        active: None,
        phases: Vec::new(),
        upcoming_deliverables: Vec::new(),
        upcoming_payments: Vec::new(),
    };

    if let Some(project) = scope.active_project() {
        let id = project.id();
        template.active = Some(ActiveProjectView {
            name: project.project.name.clone(),
            company: project.client.company_name.clone(),
            status: project.project.status,
            environment: project.project.environment,
            progress: project.project.progress_percentage,
            start_date: project.project.start_date,
            end_date: project.project.end_date,
        });

        template.phases = PhaseRepository::new(state.pool())
            .list_for_project(id)
            .await?;

        let today = Utc::now().date_naive();

        let mut deliverables = DeliverableRepository::new(state.pool())
            .list_for_project(id)
            .await?;
        deliverables.retain(|d| d.due_on.is_none_or(|due| due >= today));
        deliverables.truncate(UPCOMING_LIMIT);
        template.upcoming_deliverables = deliverables;

        let mut payments = PaymentRepository::new(state.pool())
            .list_for_project(id)
            .await?;
        payments.retain(|p| p.status != PaymentStatus::Paid);
        payments.truncate(UPCOMING_LIMIT);
        template.upcoming_payments = payments;
    }

    Ok(template)
}
