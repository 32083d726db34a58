//! End-to-end tests for login, the route guard, and project scoping.
//!
//! These tests require:
//! - A running `PostgreSQL` database, migrated (`atl-cli migrate`)
//! - The demo seed data (`atl-cli seed`)
//! - The portal running (`cargo run -p atelier-portal`)
//!
//! Run with: `cargo test -p atelier-integration-tests -- --ignored`

use reqwest::{Client, StatusCode, redirect::Policy};

/// Base URL for the portal (configurable via environment).
fn portal_base_url() -> String {
    std::env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with a cookie store that does not follow redirects, so guard
/// decisions are observable as raw 303s.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in as the given seed account and assert the expected landing page.
async fn login(client: &Client, email: &str, expected_destination: &str) {
    let base_url = portal_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email), ("password", "atelier-demo")])
        .send()
        .await
        .expect("Failed to post login form");

    assert!(resp.status().is_redirection(), "login should redirect");
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("login redirect has no location");
    assert_eq!(location, expected_destination);
}

// ============================================================================
// Guard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_anonymous_is_redirected_to_login() {
    let client = client();
    let base_url = portal_base_url();

    for path in ["/", "/calendar", "/deliverables", "/payments", "/admin"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("request failed");
        assert!(
            resp.status().is_redirection(),
            "anonymous {path} should redirect"
        );
        let location = resp.headers()["location"].to_str().unwrap();
        assert_eq!(location, "/auth/login", "anonymous {path} goes to login");
    }
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_login_page_is_reachable_anonymously() {
    let resp = client()
        .get(format!("{}/auth/login", portal_base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_client_user_is_bounced_from_admin() {
    let c = client();
    login(&c, "max@northwind.example", "/").await;

    let resp = c
        .get(format!("{}/admin", portal_base_url()))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"].to_str().unwrap(), "/");
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_team_user_is_bounced_from_admin_only_pages() {
    let c = client();
    login(&c, "tom@atelier.example", "/admin").await;

    // General admin area is open to team members...
    let resp = c
        .get(format!("{}/admin/projects", portal_base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // ...but team management declares the admin role.
    let resp = c
        .get(format!("{}/admin/team", portal_base_url()))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"].to_str().unwrap(), "/admin");
}

// ============================================================================
// Scoping Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_client_dashboard_shows_only_their_projects() {
    let c = client();
    login(&c, "max@northwind.example", "/").await;

    let body = c
        .get(format!("{}/", portal_base_url()))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("failed to read body");

    // Northwind projects are visible; the other company's project is not.
    assert!(body.contains("Brand refresh"));
    assert!(!body.contains("Launch site"));
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_switching_projects_persists_across_navigation() {
    let c = client();
    let base_url = portal_base_url();
    login(&c, "max@northwind.example", "/").await;

    // Dashboard defaults to the first project in catalog order.
    let body = c
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("failed to read body");
    assert!(body.contains("Brand refresh"));

    // Find the other project's id from the switcher options and switch.
    let other_id = body
        .split("<option value=\"")
        .skip(1)
        .map(|chunk| chunk.split('"').next().unwrap())
        .find(|id| {
            // The selected option belongs to the default project.
            !body.contains(&format!("value=\"{id}\" selected"))
        })
        .expect("switcher should list a second project");

    let resp = c
        .post(format!("{base_url}/projects/select"))
        .form(&[("project_id", other_id)])
        .send()
        .await
        .expect("failed to post selection");
    assert!(resp.status().is_redirection());

    // The selection survives subsequent navigations.
    let body = c
        .get(format!("{base_url}/deliverables"))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("failed to read body");
    assert!(body.contains("Retainer 2026"));
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_selecting_invisible_project_is_refused_silently() {
    let c = client();
    let base_url = portal_base_url();
    login(&c, "max@northwind.example", "/").await;

    // Project id 999999 is not in this client's catalog.
    let resp = c
        .post(format!("{base_url}/projects/select"))
        .form(&[("project_id", "999999")])
        .send()
        .await
        .expect("failed to post selection");
    assert!(resp.status().is_redirection());

    // The previous (default) selection is untouched.
    let body = c
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("failed to read body");
    assert!(body.contains("Brand refresh"));
}

#[tokio::test]
#[ignore = "Requires running portal and seeded database"]
async fn test_logout_clears_the_session() {
    let c = client();
    let base_url = portal_base_url();
    login(&c, "max@northwind.example", "/").await;

    let resp = c
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("failed to post logout");
    assert!(resp.status().is_redirection());

    let resp = c
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"].to_str().unwrap(), "/auth/login");
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal"]
async fn test_health_endpoints() {
    let base_url = portal_base_url();
    let c = client();

    let resp = c
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = c
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}
