//! Services for the portal.

pub mod auth;

pub use auth::AuthService;
