//! Portal user model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{ClientId, Email, Role, UserId};

/// A portal user.
///
/// `client_id` links client-role users to the company whose projects they
/// may see; it is `None` for staff roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub client_id: Option<ClientId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
