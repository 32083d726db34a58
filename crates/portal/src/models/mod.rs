//! Domain models for the portal.

pub mod project;
pub mod session;
pub mod user;

pub use project::{Assignment, CatalogProject, Client, ClientSummary, Deliverable, Payment, Phase, Project};
pub use session::{CurrentUser, session_keys};
pub use user::User;

#[cfg(test)]
pub mod test_support {
    //! Builders shared by the portal's unit tests.

    use chrono::Utc;

    use atelier_core::{ClientId, Email, Environment, ProjectId, ProjectStatus, Role, UserId};

    use super::{CatalogProject, ClientSummary, CurrentUser, Project};

    #[allow(clippy::unwrap_used)]
    pub fn client_user(id: i32, client_id: ClientId) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse("client@agency.example").unwrap(),
            name: "Client User".to_string(),
            role: Role::Client,
            client_id: Some(client_id),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn staff_user(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse("staff@agency.example").unwrap(),
            name: "Staff User".to_string(),
            role,
            client_id: None,
        }
    }

    pub fn catalog_project(id: i32, client: i32, name: &str) -> CatalogProject {
        let now = Utc::now();
        CatalogProject {
            project: Project {
                id: ProjectId::new(id),
                name: name.to_string(),
                status: ProjectStatus::Active,
                progress_percentage: 0,
                start_date: None,
                end_date: None,
                environment: Environment::Production,
                client_id: ClientId::new(client),
                roi_config: None,
                created_at: now,
                updated_at: now,
            },
            client: ClientSummary {
                company_name: format!("Client {client}"),
                logo_url: None,
            },
        }
    }
}
