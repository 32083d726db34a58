//! Identity resolution middleware and extractors.
//!
//! The Identity Resolver: given the request's session, yield the resolved
//! identity for this navigation. Three outcomes exist and the distinction
//! between the first two matters:
//!
//! - [`IdentityState::Unavailable`]: the session store could not be read.
//!   Downstream consumers must NOT treat this as "not logged in" - doing so
//!   would bounce every user to the sign-in page whenever the store blips.
//! - [`IdentityState::Anonymous`]: the store answered and no identity is
//!   present.
//! - [`IdentityState::Authenticated`]: a [`CurrentUser`] snapshot.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use atelier_core::guard::{GuardIdentity, SIGN_IN_PATH};

use crate::models::{CurrentUser, session_keys};

/// Resolved identity for one request.
#[derive(Debug, Clone)]
pub enum IdentityState {
    /// Session store unreachable; identity unknown, not absent.
    Unavailable,
    /// No valid session entry.
    Anonymous,
    /// Logged-in user snapshot.
    Authenticated(CurrentUser),
}

impl IdentityState {
    /// Reduce to the guard's input shape.
    #[must_use]
    pub const fn as_guard_identity(&self) -> GuardIdentity {
        match self {
            Self::Unavailable => GuardIdentity::Loading,
            Self::Anonymous => GuardIdentity::Anonymous,
            Self::Authenticated(user) => GuardIdentity::Authenticated(user.role),
        }
    }
}

/// Resolve the identity from a session.
///
/// Never returns an error: a store failure becomes `Unavailable`.
pub async fn resolve_identity(session: &Session) -> IdentityState {
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => IdentityState::Authenticated(user),
        Ok(None) => IdentityState::Anonymous,
        Err(e) => {
            tracing::warn!(error = %e, "session store unavailable during identity resolution");
            IdentityState::Unavailable
        }
    }
}

/// Extractor that requires an authenticated user.
///
/// If nobody is logged in, redirects to the sign-in page. If the session
/// store is unreachable, responds 503 without redirecting.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Rejection for [`RequireUser`].
pub enum IdentityRejection {
    /// No identity: go sign in.
    RedirectToLogin,
    /// Store failure: neutral 503, never a redirect.
    Unavailable,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(SIGN_IN_PATH).into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(IdentityRejection::Unavailable)?;

        match resolve_identity(session).await {
            IdentityState::Authenticated(user) => Ok(Self(user)),
            IdentityState::Anonymous => Err(IdentityRejection::RedirectToLogin),
            IdentityState::Unavailable => Err(IdentityRejection::Unavailable),
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this never rejects the request.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => match resolve_identity(session).await {
                IdentityState::Authenticated(user) => Some(user),
                _ => None,
            },
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
