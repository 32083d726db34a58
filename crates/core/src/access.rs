//! Project visibility rules.
//!
//! Two scoping mechanisms exist and are deliberately kept distinct:
//!
//! - **Ownership scoping** (clients): a client user sees exactly the projects
//!   whose `client_id` matches their own company. This is catalog-level and
//!   is the rule [`CatalogFilter`] encodes.
//! - **Assignment scoping** (team): a team member sees all projects at the
//!   catalog level; "my projects" views intersect with the assignment
//!   relation explicitly via [`assigned_project_ids`]. Callers needing the
//!   restricted set must perform that intersection themselves.
//!
//! Conflating the two would either hide projects from admins or leak
//! projects across companies, so no convenience function merges them.

use std::collections::BTreeSet;

use crate::types::{ClientId, ProjectId, Role, UserId};

/// Catalog-level visibility filter for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFilter {
    /// All projects are visible (admin and team).
    All,
    /// Only projects owned by this client company are visible.
    OwnedBy(ClientId),
}

impl CatalogFilter {
    /// Compute the catalog filter for an identity.
    ///
    /// A client user with no linked company sees nothing; that state is
    /// represented by filtering on a company that owns no projects, so the
    /// caller receives an empty catalog rather than an error.
    #[must_use]
    pub const fn for_identity(role: Role, client_id: Option<ClientId>) -> Self {
        match (role, client_id) {
            (Role::Admin | Role::Team, _) => Self::All,
            (Role::Client, Some(id)) => Self::OwnedBy(id),
            // Unlinked client account: owns nothing, sees nothing.
            (Role::Client, None) => Self::OwnedBy(ClientId::new(-1)),
        }
    }

    /// Whether a project with the given owner passes this filter.
    #[must_use]
    pub fn allows(&self, project_client: ClientId) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(id) => *id == project_client,
        }
    }
}

/// A minimal project reference carrying only what visibility needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub client_id: ClientId,
}

/// An assignment-relation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRef {
    pub user_id: UserId,
    pub project_id: ProjectId,
}

/// Filter `projects` down to those visible to the identity, preserving order.
#[must_use]
pub fn visible_projects(
    role: Role,
    client_id: Option<ClientId>,
    projects: &[ProjectRef],
) -> Vec<ProjectId> {
    let filter = CatalogFilter::for_identity(role, client_id);
    projects
        .iter()
        .filter(|p| filter.allows(p.client_id))
        .map(|p| p.id)
        .collect()
}

/// The set of project ids explicitly assigned to a user.
///
/// View-level team scoping only; never applied to the catalog itself.
#[must_use]
pub fn assigned_project_ids(user: UserId, assignments: &[AssignmentRef]) -> BTreeSet<ProjectId> {
    assignments
        .iter()
        .filter(|a| a.user_id == user)
        .map(|a| a.project_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i32, client: i32) -> ProjectRef {
        ProjectRef {
            id: ProjectId::new(id),
            client_id: ClientId::new(client),
        }
    }

    // A client identity never sees a project owned by another company.
    #[test]
    fn test_client_sees_only_own_projects() {
        let projects = [project(1, 10), project(2, 20), project(3, 10)];

        let visible = visible_projects(Role::Client, Some(ClientId::new(10)), &projects);
        assert_eq!(visible, vec![ProjectId::new(1), ProjectId::new(3)]);

        let other = visible_projects(Role::Client, Some(ClientId::new(20)), &projects);
        assert_eq!(other, vec![ProjectId::new(2)]);
    }

    #[test]
    fn test_client_without_company_sees_nothing() {
        let projects = [project(1, 10), project(2, 20)];
        let visible = visible_projects(Role::Client, None, &projects);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_admin_and_team_see_all() {
        let projects = [project(1, 10), project(2, 20)];
        for role in [Role::Admin, Role::Team] {
            let visible = visible_projects(role, None, &projects);
            assert_eq!(visible.len(), 2);
        }
    }

    #[test]
    fn test_visibility_is_order_preserving() {
        let projects = [project(5, 10), project(1, 10), project(3, 10)];
        let visible = visible_projects(Role::Client, Some(ClientId::new(10)), &projects);
        assert_eq!(
            visible,
            vec![ProjectId::new(5), ProjectId::new(1), ProjectId::new(3)]
        );
    }

    #[test]
    fn test_assignment_scoping_is_separate_from_visibility() {
        let assignments = [
            AssignmentRef {
                user_id: UserId::new(1),
                project_id: ProjectId::new(7),
            },
            AssignmentRef {
                user_id: UserId::new(2),
                project_id: ProjectId::new(8),
            },
            AssignmentRef {
                user_id: UserId::new(1),
                project_id: ProjectId::new(9),
            },
        ];

        let mine = assigned_project_ids(UserId::new(1), &assignments);
        assert!(mine.contains(&ProjectId::new(7)));
        assert!(mine.contains(&ProjectId::new(9)));
        assert!(!mine.contains(&ProjectId::new(8)));

        // The catalog for a team member is unaffected by assignments.
        let projects = [project(7, 10), project(8, 20)];
        let visible = visible_projects(Role::Team, None, &projects);
        assert_eq!(visible.len(), 2);
    }
}
