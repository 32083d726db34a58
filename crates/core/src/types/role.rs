//! User roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role of a portal user.
///
/// The role is resolved once per session snapshot and is immutable for the
/// lifetime of that snapshot; a role change takes effect on the next login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Agency administrator: full access, catalog-wide views.
    Admin,
    /// Agency team member: admin area access, optionally filtered by assignment.
    Team,
    /// Client user: scoped to the projects their company owns.
    Client,
}

impl Role {
    /// Whether this role may enter the admin area.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Team)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Team => "team",
            Self::Client => "client",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "team" => Ok(Self::Team),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_display_roundtrip() {
        for role in [Role::Admin, Role::Team, Role::Client] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_is_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Team.is_staff());
        assert!(!Role::Client.is_staff());
    }
}
