//! Admin-area route handlers.

pub mod clients;
pub mod overview;
pub mod projects;
pub mod team;
