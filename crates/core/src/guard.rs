//! The role-based route guard decision.
//!
//! A pure function evaluated once per navigation, before any view handler
//! runs. The HTTP layer wraps it in middleware; this module only decides.
//!
//! Rules, in order:
//!
//! 1. Identity still resolving -> render a neutral state, never redirect
//!    (redirecting here would flap on every page load).
//! 2. Unauthenticated -> redirect to the sign-in route.
//! 3. A route-declared role that does not match -> staff roles bounce to the
//!    admin area root, everyone else to the client area root.
//! 4. No declared role but the path is under the admin area -> require a
//!    staff role, else redirect to the client root.
//! 5. Otherwise allow. Note this admits team identities on client pages;
//!    those pages see no selection handle and render without restriction.

use crate::types::Role;

/// Sign-in route for unauthenticated users.
pub const SIGN_IN_PATH: &str = "/auth/login";
/// Admin area root.
pub const ADMIN_ROOT: &str = "/admin";
/// Client area root.
pub const CLIENT_ROOT: &str = "/";

/// Identity input to the guard, reduced to what the decision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardIdentity {
    /// Identity resolution has not completed (or the session store is
    /// unreachable). Distinct from `Anonymous` on purpose.
    Loading,
    /// No valid session.
    Anonymous,
    /// A resolved identity with its role.
    Authenticated(Role),
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render a neutral loading/unavailable state; do not redirect.
    Loading,
    /// Let the request through to the view.
    Allow,
    /// Redirect to the given path. The redirect is the entire handling:
    /// no error is surfaced for role mismatches.
    Redirect(&'static str),
}

/// Whether a path is inside the admin area.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_ROOT || path.starts_with("/admin/")
}

/// Evaluate the guard for one navigation.
///
/// Deterministic for fixed inputs; callers re-evaluate on every
/// identity/role/path change.
#[must_use]
pub fn decide(identity: GuardIdentity, required_role: Option<Role>, path: &str) -> GuardDecision {
    // Rule 1: never redirect while the identity is unresolved.
    let role = match identity {
        GuardIdentity::Loading => return GuardDecision::Loading,
        // Rule 2.
        GuardIdentity::Anonymous => return GuardDecision::Redirect(SIGN_IN_PATH),
        GuardIdentity::Authenticated(role) => role,
    };

    // Rule 3: explicit role declared on the route.
    if let Some(required) = required_role
        && role != required
    {
        return if role.is_staff() {
            GuardDecision::Redirect(ADMIN_ROOT)
        } else {
            GuardDecision::Redirect(CLIENT_ROOT)
        };
    }

    // Rule 4: undeclared routes under the admin prefix are staff-only.
    if required_role.is_none() && is_admin_path(path) && !role.is_staff() {
        return GuardDecision::Redirect(CLIENT_ROOT);
    }

    // Rule 5.
    GuardDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_never_redirects() {
        for path in ["/", "/admin", "/admin/clients", "/payments"] {
            assert_eq!(
                decide(GuardIdentity::Loading, None, path),
                GuardDecision::Loading
            );
        }
    }

    #[test]
    fn test_anonymous_redirects_to_sign_in() {
        assert_eq!(
            decide(GuardIdentity::Anonymous, None, "/"),
            GuardDecision::Redirect(SIGN_IN_PATH)
        );
        assert_eq!(
            decide(GuardIdentity::Anonymous, Some(Role::Admin), "/admin"),
            GuardDecision::Redirect(SIGN_IN_PATH)
        );
    }

    // Admin allowed into /admin/clients, client bounced to /.
    #[test]
    fn test_admin_area_access_by_role() {
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Admin), None, "/admin/clients"),
            GuardDecision::Allow
        );
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Team), None, "/admin/clients"),
            GuardDecision::Allow
        );
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Client), None, "/admin/clients"),
            GuardDecision::Redirect(CLIENT_ROOT)
        );
    }

    #[test]
    fn test_declared_role_mismatch_routes_by_identity_role() {
        // Staff mismatching a client-declared route go to the admin root.
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Team), Some(Role::Client), "/payments"),
            GuardDecision::Redirect(ADMIN_ROOT)
        );
        // Clients mismatching an admin-declared route go to the client root.
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Client), Some(Role::Admin), "/admin/team"),
            GuardDecision::Redirect(CLIENT_ROOT)
        );
    }

    // Team on a client page with no declared role is allowed.
    #[test]
    fn test_team_allowed_on_undeclared_client_pages() {
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Team), None, "/"),
            GuardDecision::Allow
        );
        assert_eq!(
            decide(GuardIdentity::Authenticated(Role::Team), None, "/calendar"),
            GuardDecision::Allow
        );
    }

    // Repeated evaluation with unchanged inputs yields the same decision.
    #[test]
    fn test_guard_is_idempotent() {
        let cases = [
            (GuardIdentity::Anonymous, None, "/"),
            (GuardIdentity::Authenticated(Role::Client), None, "/admin"),
            (GuardIdentity::Authenticated(Role::Admin), None, "/admin"),
            (GuardIdentity::Authenticated(Role::Team), Some(Role::Client), "/deliverables"),
        ];
        for (identity, required, path) in cases {
            let first = decide(identity, required, path);
            for _ in 0..10 {
                assert_eq!(decide(identity, required, path), first);
            }
        }
    }

    #[test]
    fn test_admin_prefix_matching() {
        assert!(is_admin_path("/admin"));
        assert!(is_admin_path("/admin/projects/3"));
        assert!(!is_admin_path("/administrator"));
        assert!(!is_admin_path("/"));
    }
}
