//! Payments route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use rust_decimal::Decimal;

use atelier_core::PaymentStatus;

use crate::db::PaymentRepository;
use crate::error::AppError;
use crate::filters;
use crate::models::Payment;
use crate::routes::projects::{ProjectOptionView, switcher_options};
use crate::scope::ProjectScope;
use crate::state::AppState;

/// Payments page template.
#[derive(Template, WebTemplate)]
#[template(path = "payments.html")]
pub struct PaymentsTemplate {
    pub user_name: String,
    pub is_staff: bool,
    pub switcher: Vec<ProjectOptionView>,
    pub has_project: bool,
    pub project_name: String,
    pub payments: Vec<Payment>,
    pub total: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
}

/// List the payments of the active project, with running totals.
///
/// # Errors
///
/// Returns an error if the payments query fails.
pub async fn index(
    axum::extract::State(state): axum::extract::State<AppState>,
    scope: ProjectScope,
) -> Result<impl IntoResponse, AppError> {
    let mut template = PaymentsTemplate {
        user_name: scope.user.name.clone(),
        is_staff: scope.user.role.is_staff(),
        switcher: switcher_options(&scope),
        has_project: false,
        project_name: String::new(),
        payments: Vec::new(),
        total: Decimal::ZERO,
        paid: Decimal::ZERO,
        outstanding: Decimal::ZERO,
    };

    if let Some(project) = scope.active_project() {
        template.has_project = true;
        template.project_name = project.project.name.clone();

        let payments = PaymentRepository::new(state.pool())
            .list_for_project(project.id())
            .await?;

        for payment in &payments {
            template.total += payment.amount;
            if payment.status == PaymentStatus::Paid {
                template.paid += payment.amount;
            } else {
                template.outstanding += payment.amount;
            }
        }
        template.payments = payments;
    }

    Ok(template)
}
