//! Atelier Core - Shared types and access-control rules.
//!
//! This crate provides the types and pure logic used across all Atelier
//! components:
//! - `portal` - The client/agency web portal
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows the
//! project-scoping rules to be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and statuses
//! - [`access`] - Visibility rules: which projects an identity may see
//! - [`selection`] - The active-project selection state machine
//! - [`guard`] - The role-based route guard decision

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod guard;
pub mod selection;
pub mod types;

pub use types::*;
