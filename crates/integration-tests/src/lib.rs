//! Integration tests for the Atelier portal.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and migrate + seed it
//! cargo run -p atelier-cli -- migrate
//! cargo run -p atelier-cli -- seed
//!
//! # Start the portal
//! cargo run -p atelier-portal
//!
//! # Run the ignored tests against it
//! cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! The tests in `tests/` drive the portal over HTTP with a cookie-store
//! client, exercising the login flow, the route guard, and the
//! project-scoped views end to end. They assume the demo seed data.
