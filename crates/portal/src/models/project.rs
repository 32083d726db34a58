//! Project-domain models: clients, projects, phases, deliverables, payments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{
    ClientId, DeliverableId, DeliverableStatus, Environment, PaymentId, PaymentStatus, PhaseId,
    PhaseStatus, ProjectId, ProjectStatus, UserId,
};

/// A client company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub company_name: String,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The client summary embedded in catalog rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub company_name: String,
    pub logo_url: Option<String>,
}

/// A project. Belongs to exactly one client company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    /// 0-100.
    pub progress_percentage: i16,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub environment: Environment,
    pub client_id: ClientId,
    /// Free-form ROI widget configuration; the portal passes it through.
    pub roi_config: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project as returned through the catalog: the project row plus its
/// owning client's summary, pre-joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProject {
    pub project: Project,
    pub client: ClientSummary,
}

impl CatalogProject {
    /// Convenience accessor for the project id.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.project.id
    }
}

/// Assignment-relation row: links a staff user to a project.
///
/// Client users are never assigned; their scope comes from
/// `Project::client_id` ownership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Assignment {
    pub user_id: UserId,
    pub project_id: ProjectId,
}

/// A phase of a project, driving the progress breakdown and the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub project_id: ProjectId,
    pub name: String,
    pub status: PhaseStatus,
    pub position: i32,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
}

/// A deliverable produced for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: DeliverableId,
    pub project_id: ProjectId,
    pub title: String,
    pub status: DeliverableStatus,
    pub due_on: Option<NaiveDate>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment line on a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub project_id: ProjectId,
    pub description: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub due_on: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
}
