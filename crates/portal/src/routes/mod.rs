//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check (unguarded)
//! GET  /health/ready           - Readiness check (unguarded)
//!
//! # Auth (unguarded)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//!
//! # Client area (guarded; no declared role - any authenticated identity)
//! GET  /                       - Dashboard scoped to the active project
//! GET  /calendar               - Month calendar for the active project
//! GET  /deliverables           - Deliverables for the active project
//! GET  /payments               - Payments for the active project
//! POST /projects/select        - Switch the active project
//!
//! # Admin area (guarded; staff only via the /admin prefix rule)
//! GET  /admin                  - Overview
//! GET  /admin/clients          - Client companies
//! POST /admin/clients          - Create client company
//! POST /admin/clients/{id}/delete
//! GET  /admin/projects         - Projects (?mine=1 intersects assignments)
//! POST /admin/projects         - Create project
//! GET  /admin/projects/{id}    - Project detail (phases/deliverables/payments)
//! POST /admin/projects/{id}/status
//! POST /admin/projects/{id}/phases
//! POST /admin/phases/{id}/status
//! POST /admin/projects/{id}/deliverables
//! POST /admin/deliverables/{id}/status
//! POST /admin/projects/{id}/payments
//! POST /admin/payments/{id}/status
//! POST /admin/assignments      - Assign staff user to project
//! POST /admin/assignments/delete
//!
//! # Team management (guarded; declared role: admin)
//! GET  /admin/team             - Team and client users
//! POST /admin/team             - Create user
//! POST /admin/team/{id}/delete
//! ```

pub mod admin;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod deliverables;
pub mod payments;
pub mod projects;

use axum::{
    Extension, Router,
    middleware::from_fn,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};

use atelier_core::Role;

use crate::middleware::guard::{RequiredRole, route_guard};
use crate::state::AppState;

/// Deserialize empty form strings as `None` for optional parsed fields.
///
/// HTML forms submit unfilled inputs as empty strings, which would
/// otherwise fail to parse as dates, numbers, or ids.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Create the auth routes router. Not guarded: this is the surface
/// anonymous users must be able to reach.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the client-area router.
///
/// No route declares a required role: per the guard's fall-through rule,
/// any authenticated identity may reach these pages. Staff see them
/// without a selection handle (catalog-wide, no restriction).
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/calendar", get(calendar::show))
        .route("/deliverables", get(deliverables::index))
        .route("/payments", get(payments::index))
        .route("/projects/select", post(projects::select))
        .layer(from_fn(route_guard))
}

/// Create the admin-area router, nested under `/admin`.
///
/// Most routes rely on the guard's admin-prefix rule (staff only). The
/// team-management routes additionally declare `Role::Admin`, so a team
/// identity hitting them is bounced to the admin root.
pub fn admin_routes() -> Router<AppState> {
    let team_management = Router::new()
        .route("/team", get(admin::team::index).post(admin::team::create_user))
        .route("/team/{id}/delete", post(admin::team::delete_user))
        // Declared role: evaluated by the guard as rule 3.
        .layer(from_fn(route_guard))
        .layer(Extension(RequiredRole(Role::Admin)));

    let general = Router::new()
        .route("/", get(admin::overview::show))
        .route(
            "/clients",
            get(admin::clients::index).post(admin::clients::create),
        )
        .route("/clients/{id}/delete", post(admin::clients::delete))
        .route(
            "/projects",
            get(admin::projects::index).post(admin::projects::create),
        )
        .route("/projects/{id}", get(admin::projects::detail))
        .route("/projects/{id}/status", post(admin::projects::update_status))
        .route("/projects/{id}/phases", post(admin::projects::create_phase))
        .route("/phases/{id}/status", post(admin::projects::update_phase_status))
        .route(
            "/projects/{id}/deliverables",
            post(admin::projects::create_deliverable),
        )
        .route(
            "/deliverables/{id}/status",
            post(admin::projects::update_deliverable_status),
        )
        .route("/projects/{id}/payments", post(admin::projects::create_payment))
        .route("/payments/{id}/status", post(admin::projects::update_payment_status))
        .route("/assignments", post(admin::team::assign))
        .route("/assignments/delete", post(admin::team::unassign))
        .layer(from_fn(route_guard));

    general.merge(team_management)
}
