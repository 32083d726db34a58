//! Route guard middleware.
//!
//! Applies the pure decision in `atelier_core::guard` to every request the
//! guarded routers see, so the guard is re-evaluated per navigation rather
//! than once at mount. Role declarations live on the routers: a router
//! wraps itself in `Extension(RequiredRole(..))` and the middleware reads
//! that declaration back off the request.

use axum::{
    extract::{OriginalUri, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use atelier_core::Role;
use atelier_core::guard::{GuardDecision, decide};

use crate::error::set_sentry_user;
use crate::middleware::identity::{IdentityState, resolve_identity};

/// Role declared as required for every route in a router.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRole(pub Role);

/// Guard every request before its view handler runs.
///
/// Decisions:
/// - `Loading` (session store unavailable): neutral 503, no redirect.
/// - `Redirect`: silent redirect; the redirect is the entire handling.
/// - `Allow`: run the handler, with Sentry user context attached.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let Some(session) = request.extensions().get::<Session>() else {
        // Session layer missing entirely; treat like a store failure.
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let identity = resolve_identity(session).await;
    let required_role = request.extensions().get::<RequiredRole>().map(|r| r.0);
    // Nested routers strip the matched prefix from `uri()`; the admin-prefix
    // rule must see the path the client actually requested.
    let path = request.extensions().get::<OriginalUri>().map_or_else(
        || request.uri().path().to_owned(),
        |original| original.path().to_owned(),
    );

    match decide(identity.as_guard_identity(), required_role, &path) {
        GuardDecision::Loading => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        GuardDecision::Redirect(target) => Redirect::to(target).into_response(),
        GuardDecision::Allow => {
            if let IdentityState::Authenticated(user) = &identity {
                set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));
            }
            next.run(request).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
        routing::post,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

    use atelier_core::{ClientId, Role};

    use crate::config::PortalConfig;
    use crate::middleware::identity::set_current_user;
    use crate::models::test_support;
    use crate::state::AppState;

    fn test_state() -> AppState {
        let config = PortalConfig {
            database_url: "postgres://127.0.0.1:1/unreachable".to_string().into(),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_string(),
            session_secret: "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
                .to_string()
                .into(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        // Lazy pool pointing nowhere: guard decisions never touch it, and a
        // handler that does reach it fails without a redirect.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .unwrap();
        AppState::new(config, pool)
    }

    async fn sign_in_client(session: Session) -> StatusCode {
        let user = test_support::client_user(7, ClientId::new(1));
        set_current_user(&session, &user).await.unwrap();
        StatusCode::NO_CONTENT
    }

    async fn sign_in_team(session: Session) -> StatusCode {
        let user = test_support::staff_user(8, Role::Team);
        set_current_user(&session, &user).await.unwrap();
        StatusCode::NO_CONTENT
    }

    /// The guarded routers mounted exactly as the portal binary mounts them,
    /// plus unguarded sign-in routes that put a user in the session store.
    fn app() -> Router {
        Router::new()
            .merge(crate::routes::client_routes())
            .nest("/auth", crate::routes::auth_routes())
            .nest("/admin", crate::routes::admin_routes())
            .route("/session/client", post(sign_in_client))
            .route("/session/team", post(sign_in_team))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(test_state())
    }

    async fn sign_in(app: &Router, path: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn get_with_cookie(app: &Router, path: &str, cookie: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_admin_request_redirects_to_login() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/admin/clients")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    // The admin router is nested, so the guard must evaluate the original
    // request path, not the prefix-stripped one the nested router sees.
    #[tokio::test]
    async fn test_client_is_bounced_from_nested_admin_routes() {
        let app = app();
        let cookie = sign_in(&app, "/session/client").await;

        for path in ["/admin", "/admin/clients", "/admin/projects/3"] {
            let response = get_with_cookie(&app, path, &cookie).await;
            assert_eq!(
                response.status(),
                StatusCode::SEE_OTHER,
                "client user on {path}"
            );
            assert_eq!(response.headers()[header::LOCATION], "/");
        }
    }

    #[tokio::test]
    async fn test_team_is_bounced_from_team_management_only() {
        let app = app();
        let cookie = sign_in(&app, "/session/team").await;

        // Team management declares the admin role.
        let response = get_with_cookie(&app, "/admin/team", &cookie).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin");

        // The general admin area lets the team member through to the
        // handler (which then fails on the dead pool, not with a redirect).
        let response = get_with_cookie(&app, "/admin/projects", &cookie).await;
        assert!(!response.status().is_redirection());
    }
}
