//! Session-related types.
//!
//! Types stored in the session for authentication and project-scoping state.

use serde::{Deserialize, Serialize};

use atelier_core::{ClientId, Email, Role, UserId};

use super::User;

/// Session-stored user identity.
///
/// A snapshot taken at login; a role change takes effect on the next login,
/// never mid-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Resolved role for this session.
    pub role: Role,
    /// Linked company for client-role users.
    pub client_id: Option<ClientId>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            client_id: user.client_id,
        }
    }
}

/// Session keys for portal data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the single persisted active-project slot.
    ///
    /// Only the selection driver writes this key; it is read once per
    /// request when the selection machine is initialized.
    pub const SELECTED_PROJECT: &str = "selected_project_id";
}
