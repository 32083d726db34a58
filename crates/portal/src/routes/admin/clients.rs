//! Admin client-company management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use atelier_core::ClientId;

use crate::db::{ClientRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::middleware::identity::RequireUser;
use crate::models::Client;
use crate::state::AppState;

/// Client list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/clients.html")]
pub struct ClientsTemplate {
    pub user_name: String,
    pub clients: Vec<Client>,
    pub error: Option<String>,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// New-client form data.
#[derive(Debug, Deserialize)]
pub struct NewClientForm {
    pub company_name: String,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// List client companies.
///
/// # Errors
///
/// Returns an error if the listing query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    axum::extract::Query(query): axum::extract::Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ClientsTemplate {
        user_name: user.name,
        clients: ClientRepository::new(state.pool()).list_all().await?,
        error: query.error,
    })
}

/// Create a client company.
///
/// A duplicate company name redirects back with an error message instead
/// of surfacing a 409 page.
///
/// # Errors
///
/// Returns an error if the insert fails for a non-conflict reason.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Form(form): Form<NewClientForm>,
) -> Result<Response, AppError> {
    let name = form.company_name.trim();
    if name.is_empty() {
        return Ok(Redirect::to("/admin/clients?error=Company+name+is+required").into_response());
    }

    let result = ClientRepository::new(state.pool())
        .create(
            name,
            none_if_blank(form.logo_url).as_deref(),
            none_if_blank(form.contact_email).as_deref(),
        )
        .await;

    match result {
        Ok(client) => {
            tracing::info!(client_id = %client.id, "client company created");
            Ok(Redirect::to("/admin/clients").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            Ok(Redirect::to("/admin/clients?error=Company+name+already+exists").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a client company. Cascades to its projects, which also drops
/// them from every affected client's catalog on the next request.
///
/// # Errors
///
/// Returns an error if the delete fails or the client does not exist.
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    ClientRepository::new(state.pool())
        .delete(ClientId::new(id))
        .await?;
    tracing::info!(client_id = id, "client company deleted");
    Ok(Redirect::to("/admin/clients").into_response())
}
