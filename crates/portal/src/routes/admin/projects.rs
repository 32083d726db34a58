//! Admin project management.
//!
//! The listing supports `?mine=1`, which narrows the full catalog to the
//! caller's explicitly assigned projects. That narrowing happens here, at
//! the view level, by intersecting with the assignment set; the catalog
//! itself stays unfiltered for staff.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use atelier_core::{
    ClientId, DeliverableId, DeliverableStatus, Environment, PaymentId, PaymentStatus, PhaseId,
    PhaseStatus, ProjectId, ProjectStatus,
};

use crate::catalog::{PgCatalogSource, ProjectCatalog};
use crate::db::{
    ClientRepository, DeliverableRepository, PaymentRepository, PhaseRepository,
    ProjectRepository, UserRepository,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::identity::RequireUser;
use crate::models::{CatalogProject, Client, Deliverable, Payment, Phase, User};
use crate::routes::empty_string_as_none;
use crate::state::AppState;

// =============================================================================
// Listing
// =============================================================================

/// Query parameters for the project listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `1` narrows to the caller's assigned projects.
    pub mine: Option<String>,
}

/// Project list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/projects.html")]
pub struct ProjectsTemplate {
    pub user_name: String,
    pub mine_only: bool,
    pub projects: Vec<CatalogProject>,
    pub clients: Vec<Client>,
}

/// List projects, optionally narrowed to the caller's assignments.
///
/// # Errors
///
/// Returns an error if a listing query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalog_svc = ProjectCatalog::new(PgCatalogSource::new(state.pool()));
    let catalog = catalog_svc.visible_to(&user).await;

    let mine_only = query.mine.as_deref() == Some("1");
    let projects = if mine_only {
        let assigned = catalog_svc.assigned_to(&user).await;
        catalog
            .projects
            .into_iter()
            .filter(|p| assigned.contains(&p.id()))
            .collect()
    } else {
        catalog.projects
    };

    Ok(ProjectsTemplate {
        user_name: user.name,
        mine_only,
        projects,
        clients: ClientRepository::new(state.pool()).list_all().await?,
    })
}

// =============================================================================
// Create / status
// =============================================================================

/// New-project form data.
#[derive(Debug, Deserialize)]
pub struct NewProjectForm {
    pub name: String,
    pub client_id: i32,
    pub environment: Environment,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_date: Option<NaiveDate>,
}

/// Create a project.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Form(form): Form<NewProjectForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("project name is required".to_string()));
    }

    let project = ProjectRepository::new(state.pool())
        .create(
            name,
            ClientId::new(form.client_id),
            form.environment,
            form.start_date,
            form.end_date,
        )
        .await?;

    tracing::info!(project_id = %project.id, client_id = %project.client_id, "project created");
    Ok(Redirect::to(&format!("/admin/projects/{}", project.id.as_i32())).into_response())
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: ProjectStatus,
    pub progress_percentage: i16,
}

/// Update a project's status and progress.
///
/// # Errors
///
/// Returns an error if the project does not exist.
pub async fn update_status(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    ProjectRepository::new(state.pool())
        .update_status(ProjectId::new(id), form.status, form.progress_percentage)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{id}")).into_response())
}

// =============================================================================
// Detail
// =============================================================================

/// An assignment row joined with the user, for the detail page.
pub struct AssigneeView {
    pub user_id: i32,
    pub name: String,
    pub email: String,
}

/// Project detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/project_detail.html")]
pub struct ProjectDetailTemplate {
    pub user_name: String,
    pub project: CatalogProject,
    pub phases: Vec<Phase>,
    pub deliverables: Vec<Deliverable>,
    pub payments: Vec<Payment>,
    pub assignees: Vec<AssigneeView>,
    pub staff: Vec<User>,
}

/// Display one project with its phases, deliverables, payments, and
/// assigned staff.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no project has this id.
pub async fn detail(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let id = ProjectId::new(id);
    let pool = state.pool();

    let project = ProjectRepository::new(pool)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project {}", id.as_i32())))?;

    let users = UserRepository::new(pool);
    let all_users = users.list_all().await?;
    let assignments = users.assignments_for_project(id).await?;

    let assignees = assignments
        .iter()
        .filter_map(|a| all_users.iter().find(|u| u.id == a.user_id))
        .map(|u| AssigneeView {
            user_id: u.id.as_i32(),
            name: u.name.clone(),
            email: u.email.as_str().to_string(),
        })
        .collect();

    // Assignment candidates: staff not yet on the project.
    let staff = all_users
        .into_iter()
        .filter(|u| u.role.is_staff() && !assignments.iter().any(|a| a.user_id == u.id))
        .collect();

    Ok(ProjectDetailTemplate {
        user_name: user.name,
        project,
        phases: PhaseRepository::new(pool).list_for_project(id).await?,
        deliverables: DeliverableRepository::new(pool).list_for_project(id).await?,
        payments: PaymentRepository::new(pool).list_for_project(id).await?,
        assignees,
        staff,
    })
}

// =============================================================================
// Phases
// =============================================================================

/// New-phase form data.
#[derive(Debug, Deserialize)]
pub struct NewPhaseForm {
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub starts_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ends_on: Option<NaiveDate>,
}

/// Add a phase to a project. Position is appended automatically.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create_phase(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<NewPhaseForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("phase name is required".to_string()));
    }

    PhaseRepository::new(state.pool())
        .create(ProjectId::new(id), name, form.starts_on, form.ends_on)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{id}")).into_response())
}

/// Phase status form data.
#[derive(Debug, Deserialize)]
pub struct PhaseStatusForm {
    pub status: PhaseStatus,
    /// The project to return to.
    pub project_id: i32,
}

/// Update a phase's status.
///
/// # Errors
///
/// Returns an error if the phase does not exist.
pub async fn update_phase_status(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<PhaseStatusForm>,
) -> Result<Response, AppError> {
    PhaseRepository::new(state.pool())
        .update_status(PhaseId::new(id), form.status)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{}", form.project_id)).into_response())
}

// =============================================================================
// Deliverables
// =============================================================================

/// New-deliverable form data.
#[derive(Debug, Deserialize)]
pub struct NewDeliverableForm {
    pub title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_on: Option<NaiveDate>,
    pub file_url: Option<String>,
}

/// Add a deliverable to a project.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create_deliverable(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<NewDeliverableForm>,
) -> Result<Response, AppError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("deliverable title is required".to_string()));
    }

    let file_url = form.file_url.filter(|u| !u.trim().is_empty());
    DeliverableRepository::new(state.pool())
        .create(ProjectId::new(id), title, form.due_on, file_url.as_deref())
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{id}")).into_response())
}

/// Deliverable status form data.
#[derive(Debug, Deserialize)]
pub struct DeliverableStatusForm {
    pub status: DeliverableStatus,
    pub project_id: i32,
}

/// Update a deliverable's status.
///
/// # Errors
///
/// Returns an error if the deliverable does not exist.
pub async fn update_deliverable_status(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<DeliverableStatusForm>,
) -> Result<Response, AppError> {
    DeliverableRepository::new(state.pool())
        .update_status(DeliverableId::new(id), form.status)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{}", form.project_id)).into_response())
}

// =============================================================================
// Payments
// =============================================================================

/// New-payment form data.
#[derive(Debug, Deserialize)]
pub struct NewPaymentForm {
    pub description: String,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_on: Option<NaiveDate>,
}

/// Add a payment line to a project.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create_payment(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<NewPaymentForm>,
) -> Result<Response, AppError> {
    let description = form.description.trim();
    if description.is_empty() {
        return Err(AppError::BadRequest("payment description is required".to_string()));
    }
    if form.amount.is_sign_negative() {
        return Err(AppError::BadRequest("payment amount must not be negative".to_string()));
    }

    PaymentRepository::new(state.pool())
        .create(ProjectId::new(id), description, form.amount, form.due_on)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{id}")).into_response())
}

/// Payment status form data.
#[derive(Debug, Deserialize)]
pub struct PaymentStatusForm {
    pub status: PaymentStatus,
    pub project_id: i32,
}

/// Update a payment's status. Marking a payment paid stamps `paid_at`.
///
/// # Errors
///
/// Returns an error if the payment does not exist.
pub async fn update_payment_status(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
    Form(form): Form<PaymentStatusForm>,
) -> Result<Response, AppError> {
    PaymentRepository::new(state.pool())
        .update_status(PaymentId::new(id), form.status)
        .await?;
    Ok(Redirect::to(&format!("/admin/projects/{}", form.project_id)).into_response())
}
