//! The project catalog accessor.
//!
//! [`CatalogSource`] is the data-access boundary: typed rows in, boundary
//! error out. [`ProjectCatalog`] sits on top and enforces the error policy
//! of the core: a fetch failure is converted into an empty, `degraded`
//! catalog and logged - it never propagates. Callers only ever see
//! have-data or don't-have-data.

use std::collections::BTreeSet;

use atelier_core::access::CatalogFilter;
use atelier_core::{ProjectId, UserId};

use crate::db::{ProjectRepository, RepositoryError, UserRepository};
use crate::models::{Assignment, CatalogProject, CurrentUser};

/// The ordered set of projects visible to one identity.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Visible projects in stable order (`created_at ASC, id ASC`).
    pub projects: Vec<CatalogProject>,
    /// True when the underlying fetch failed and the list is empty for
    /// that reason rather than because nothing is visible.
    pub degraded: bool,
}

impl Catalog {
    /// Project ids in catalog order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProjectId> {
        self.projects.iter().map(CatalogProject::id).collect()
    }

    /// Find a project by id.
    #[must_use]
    pub fn get(&self, id: ProjectId) -> Option<&CatalogProject> {
        self.projects.iter().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Data-access boundary for catalog queries.
///
/// Implementations return typed rows with the client summary pre-joined,
/// or a boundary error. Nothing above this trait sees SQL.
pub trait CatalogSource: Send + Sync {
    /// Fetch projects passing the filter, in stable catalog order.
    fn fetch_projects(
        &self,
        filter: CatalogFilter,
    ) -> impl Future<Output = Result<Vec<CatalogProject>, RepositoryError>> + Send;

    /// Fetch the assignment rows for one user.
    fn fetch_assignments(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RepositoryError>> + Send;
}

/// Postgres-backed catalog source.
pub struct PgCatalogSource<'a> {
    pool: &'a sqlx::PgPool,
}

impl<'a> PgCatalogSource<'a> {
    #[must_use]
    pub const fn new(pool: &'a sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogSource for PgCatalogSource<'_> {
    async fn fetch_projects(
        &self,
        filter: CatalogFilter,
    ) -> Result<Vec<CatalogProject>, RepositoryError> {
        let repo = ProjectRepository::new(self.pool);
        match filter {
            CatalogFilter::All => repo.list_all().await,
            CatalogFilter::OwnedBy(client_id) => repo.list_owned_by(client_id).await,
        }
    }

    async fn fetch_assignments(&self, user: UserId) -> Result<Vec<Assignment>, RepositoryError> {
        UserRepository::new(self.pool).assignments_for_user(user).await
    }
}

/// The Project Catalog Accessor.
///
/// Computes the visibility filter from the identity (ownership scoping for
/// clients, everything for staff) and runs it through the source. Team
/// assignment scoping is deliberately NOT part of the catalog; callers
/// wanting "my projects" intersect with [`Self::assigned_to`] explicitly.
pub struct ProjectCatalog<S> {
    source: S,
}

impl<S: CatalogSource> ProjectCatalog<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The catalog visible to this identity.
    ///
    /// Never fails: on a fetch error the result is empty with
    /// `degraded = true`, and the error is logged here at the boundary.
    pub async fn visible_to(&self, user: &CurrentUser) -> Catalog {
        let filter = CatalogFilter::for_identity(user.role, user.client_id);
        match self.source.fetch_projects(filter).await {
            Ok(projects) => Catalog {
                projects,
                degraded: false,
            },
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "catalog fetch failed; serving degraded empty catalog");
                Catalog {
                    projects: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    /// The set of project ids explicitly assigned to this user.
    ///
    /// View-level team scoping. Degrades to the empty set on fetch failure.
    pub async fn assigned_to(&self, user: &CurrentUser) -> BTreeSet<ProjectId> {
        match self.source.fetch_assignments(user.id).await {
            Ok(assignments) => assignments.iter().map(|a| a.project_id).collect(),
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "assignment fetch failed");
                BTreeSet::new()
            }
        }
    }
}

// =============================================================================
// In-memory source (tests and harnesses)
// =============================================================================

/// In-memory catalog source backing the unit tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    pub projects: Vec<CatalogProject>,
    pub assignments: Vec<Assignment>,
    /// When set, every fetch fails with a database-shaped error.
    pub fail: bool,
}

impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_projects(
        &self,
        filter: CatalogFilter,
    ) -> Result<Vec<CatalogProject>, RepositoryError> {
        if self.fail {
            return Err(RepositoryError::DataCorruption("source offline".into()));
        }
        Ok(self
            .projects
            .iter()
            .filter(|p| filter.allows(p.project.client_id))
            .cloned()
            .collect())
    }

    async fn fetch_assignments(&self, user: UserId) -> Result<Vec<Assignment>, RepositoryError> {
        if self.fail {
            return Err(RepositoryError::DataCorruption("source offline".into()));
        }
        Ok(self
            .assignments
            .iter()
            .filter(|a| a.user_id == user)
            .copied()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::test_support::{catalog_project, client_user, staff_user};
    use atelier_core::{ClientId, Role};

    fn source() -> InMemoryCatalogSource {
        InMemoryCatalogSource {
            projects: vec![
                catalog_project(1, 10, "Brand refresh"),
                catalog_project(2, 20, "Launch site"),
                catalog_project(3, 10, "Retainer"),
            ],
            assignments: vec![Assignment {
                user_id: UserId::new(5),
                project_id: ProjectId::new(2),
            }],
            fail: false,
        }
    }

    // The catalog for a client contains only their company's projects.
    #[tokio::test]
    async fn test_client_catalog_is_ownership_scoped() {
        let catalog = ProjectCatalog::new(source());
        let user = client_user(1, ClientId::new(10));

        let result = catalog.visible_to(&user).await;
        assert_eq!(result.ids(), vec![ProjectId::new(1), ProjectId::new(3)]);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_staff_catalog_is_unfiltered() {
        let catalog = ProjectCatalog::new(source());
        for role in [Role::Admin, Role::Team] {
            let user = staff_user(5, role);
            let result = catalog.visible_to(&user).await;
            assert_eq!(result.projects.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_instead_of_erroring() {
        let mut src = source();
        src.fail = true;
        let catalog = ProjectCatalog::new(src);

        let result = catalog.visible_to(&client_user(1, ClientId::new(10))).await;
        assert!(result.projects.is_empty());
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_assignments_are_view_level_not_catalog_level() {
        let catalog = ProjectCatalog::new(source());
        let team = staff_user(5, Role::Team);

        // Full catalog regardless of assignment...
        let visible = catalog.visible_to(&team).await;
        assert_eq!(visible.projects.len(), 3);

        // ...and the explicit assignment set is separate.
        let mine = catalog.assigned_to(&team).await;
        assert_eq!(mine.into_iter().collect::<Vec<_>>(), vec![ProjectId::new(2)]);
    }
}
