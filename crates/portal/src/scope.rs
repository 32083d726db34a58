//! The project-scope driver and extractor.
//!
//! The selection machine in `atelier_core::selection` is pure; this module
//! drives it. Because the portal is server-rendered, the machine is rebuilt
//! on every request from its two durable inputs - the persisted session
//! slot and a fresh catalog - which makes each navigation a full
//! initialize-and-reconcile cycle: a stale slot is repaired the moment the
//! catalog no longer contains it.
//!
//! The persisted slot has exactly one writer: [`apply_persist_effect`].
//! It re-reads the session's current user immediately before writing and
//! drops the write if the session has been taken over by another login in
//! the meantime (the stale-async-discard rule; the machine's owner tagging
//! covers the in-memory side, this covers the slot).
//!
//! Non-client roles never build a machine. Their [`ProjectScope`] carries
//! `handle: None`, and every consumer treats the absent handle as "no
//! restriction", not as an error.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use atelier_core::guard::SIGN_IN_PATH;
use atelier_core::selection::{PersistEffect, SelectionEvent, SelectionMachine};
use atelier_core::{ProjectId, Role};

use crate::catalog::{Catalog, CatalogSource, PgCatalogSource, ProjectCatalog};
use crate::error::AppError;
use crate::middleware::identity::{IdentityState, resolve_identity};
use crate::models::{CatalogProject, CurrentUser, session_keys};
use crate::state::AppState;

/// The active selection for a client session.
#[derive(Debug, Clone)]
pub struct ActiveSelection {
    /// The selected project, with its client summary.
    pub project: CatalogProject,
}

/// Everything a scope-consuming view needs for one request.
pub struct ProjectScope {
    /// The resolved identity.
    pub user: CurrentUser,
    /// The catalog visible to that identity.
    pub catalog: Catalog,
    /// The single active selection; `None` for non-client roles (meaning
    /// "no restriction") and for clients with an empty catalog.
    pub handle: Option<ActiveSelection>,
}

impl ProjectScope {
    /// The active project, if one is selected.
    #[must_use]
    pub fn active_project(&self) -> Option<&CatalogProject> {
        self.handle.as_ref().map(|h| &h.project)
    }
}

/// Initialize the machine for one request.
///
/// Pure with respect to I/O: the caller supplies the persisted slot and the
/// fresh catalog, and receives the machine plus the effect to apply.
#[must_use]
pub fn initialize_machine(
    user: &CurrentUser,
    restored: Option<ProjectId>,
    catalog: &Catalog,
) -> (SelectionMachine, PersistEffect) {
    let mut machine = SelectionMachine::new();
    machine.apply(SelectionEvent::SessionStarted { owner: user.id });
    let effect = machine.apply(SelectionEvent::CatalogLoaded {
        owner: user.id,
        restored,
        catalog: catalog.ids(),
    });
    (machine, effect)
}

/// Read the persisted selection slot.
///
/// A store failure reads as "no slot": the machine then defaults and the
/// slot is rewritten, which is the safe direction to fail in.
async fn read_slot(session: &Session) -> Option<ProjectId> {
    session
        .get::<ProjectId>(session_keys::SELECTED_PROJECT)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "selection slot unreadable; treating as unset");
            None
        })
}

/// Apply a persistence effect to the session slot.
///
/// The single writer of the slot. Re-checks the session's current user
/// first: if another identity owns the session now, the write is stale and
/// is dropped.
pub async fn apply_persist_effect(
    session: &Session,
    owner: &CurrentUser,
    effect: PersistEffect,
) -> Result<(), AppError> {
    if matches!(effect, PersistEffect::KeepAsIs) {
        return Ok(());
    }

    let still_owner = match resolve_identity(session).await {
        IdentityState::Authenticated(current) => current.id == owner.id,
        _ => false,
    };
    if !still_owner {
        tracing::debug!(user_id = %owner.id, "session owner changed; dropping stale selection write");
        return Ok(());
    }

    match effect {
        PersistEffect::KeepAsIs => {}
        PersistEffect::Write(id) => {
            session.insert(session_keys::SELECTED_PROJECT, id).await?;
        }
        PersistEffect::Clear => {
            session
                .remove::<ProjectId>(session_keys::SELECTED_PROJECT)
                .await?;
        }
    }
    Ok(())
}

/// Build the scope for a resolved identity.
pub async fn build_scope<S: CatalogSource>(
    session: &Session,
    source: S,
    user: CurrentUser,
) -> Result<ProjectScope, AppError> {
    let catalog_svc = ProjectCatalog::new(source);
    let catalog = catalog_svc.visible_to(&user).await;

    // Staff sessions have no single-project scope; the machine is bypassed
    // entirely and the handle is absent.
    if user.role != Role::Client {
        return Ok(ProjectScope {
            user,
            catalog,
            handle: None,
        });
    }

    let restored = read_slot(session).await;
    let (machine, effect) = initialize_machine(&user, restored, &catalog);
    // Write-before-return: the slot is durable before any view renders.
    apply_persist_effect(session, &user, effect).await?;

    let handle = machine
        .selected()
        .and_then(|id| catalog.get(id))
        .map(|project| ActiveSelection {
            project: project.clone(),
        });

    Ok(ProjectScope {
        user,
        catalog,
        handle,
    })
}

/// Explicitly switch the active project (or clear it with `None`).
///
/// The only public mutation path for the selection. Switching to a project
/// outside the caller's catalog is refused silently by the machine.
pub async fn switch_project(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    selection: Option<ProjectId>,
) -> Result<(), AppError> {
    if user.role != Role::Client {
        // Staff have no selection to switch.
        return Ok(());
    }

    let catalog_svc = ProjectCatalog::new(PgCatalogSource::new(state.pool()));
    let catalog = catalog_svc.visible_to(user).await;

    let restored = read_slot(session).await;
    let (mut machine, init_effect) = initialize_machine(user, restored, &catalog);
    apply_persist_effect(session, user, init_effect).await?;

    let effect = machine.apply(SelectionEvent::Switched {
        owner: user.id,
        selection,
    });
    apply_persist_effect(session, user, effect).await
}

/// Clear the selection slot on logout.
pub async fn clear_selection(session: &Session) -> Result<(), AppError> {
    session
        .remove::<ProjectId>(session_keys::SELECTED_PROJECT)
        .await?;
    Ok(())
}

// =============================================================================
// Extractor
// =============================================================================

/// Rejection for the [`ProjectScope`] extractor.
pub enum ScopeRejection {
    /// No identity: go sign in.
    RedirectToLogin,
    /// Session store failure: neutral 503.
    Unavailable,
    /// Scope assembly failed.
    Error(AppError),
}

impl IntoResponse for ScopeRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(SIGN_IN_PATH).into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            Self::Error(e) => e.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for ProjectScope {
    type Rejection = ScopeRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(ScopeRejection::Unavailable)?;

        let user = match resolve_identity(&session).await {
            IdentityState::Authenticated(user) => user,
            IdentityState::Anonymous => return Err(ScopeRejection::RedirectToLogin),
            IdentityState::Unavailable => return Err(ScopeRejection::Unavailable),
        };

        build_scope(&session, PgCatalogSource::new(state.pool()), user)
            .await
            .map_err(ScopeRejection::Error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::test_support::{catalog_project, client_user};
    use atelier_core::ClientId;
    use atelier_core::selection::SelectionState;

    fn catalog_of(projects: Vec<CatalogProject>) -> Catalog {
        Catalog {
            projects,
            degraded: false,
        }
    }

    #[test]
    fn test_initialize_defaults_to_first_and_writes_slot() {
        let user = client_user(1, ClientId::new(10));
        let catalog = catalog_of(vec![
            catalog_project(1, 10, "Brand refresh"),
            catalog_project(2, 10, "Retainer"),
        ]);

        let (machine, effect) = initialize_machine(&user, None, &catalog);
        assert_eq!(machine.selected(), Some(ProjectId::new(1)));
        assert_eq!(effect, PersistEffect::Write(ProjectId::new(1)));
    }

    #[test]
    fn test_initialize_restores_valid_slot() {
        let user = client_user(1, ClientId::new(10));
        let catalog = catalog_of(vec![
            catalog_project(1, 10, "Brand refresh"),
            catalog_project(2, 10, "Retainer"),
        ]);

        let (machine, effect) = initialize_machine(&user, Some(ProjectId::new(2)), &catalog);
        assert_eq!(machine.selected(), Some(ProjectId::new(2)));
        assert_eq!(effect, PersistEffect::KeepAsIs);
    }

    #[test]
    fn test_initialize_repairs_stale_slot() {
        // The per-request rebuild IS the reconciliation: a slot pointing at
        // a vanished project is replaced by catalog[0] on the next request.
        let user = client_user(1, ClientId::new(10));
        let catalog = catalog_of(vec![catalog_project(3, 10, "Retainer")]);

        let (machine, effect) = initialize_machine(&user, Some(ProjectId::new(9)), &catalog);
        assert_eq!(machine.selected(), Some(ProjectId::new(3)));
        assert_eq!(effect, PersistEffect::Write(ProjectId::new(3)));
    }

    #[test]
    fn test_initialize_with_empty_catalog_clears_slot() {
        let user = client_user(1, ClientId::new(10));
        let catalog = catalog_of(vec![]);

        let (machine, effect) = initialize_machine(&user, Some(ProjectId::new(9)), &catalog);
        assert!(matches!(machine.state(), SelectionState::Empty { .. }));
        assert_eq!(effect, PersistEffect::Clear);
    }

    #[test]
    fn test_degraded_catalog_behaves_as_empty() {
        // A failed fetch reaches the machine as an empty catalog; views get
        // the empty-state message, never an exception.
        let user = client_user(1, ClientId::new(10));
        let catalog = Catalog {
            projects: vec![],
            degraded: true,
        };

        let (machine, _) = initialize_machine(&user, None, &catalog);
        assert!(matches!(machine.state(), SelectionState::Empty { .. }));
    }
}
