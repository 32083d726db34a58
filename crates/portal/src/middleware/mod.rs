//! Middleware for the portal.

pub mod guard;
pub mod identity;
pub mod security_headers;
pub mod session;

pub use guard::{RequiredRole, route_guard};
pub use identity::{
    IdentityState, OptionalUser, RequireUser, clear_current_user, resolve_identity,
    set_current_user,
};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
