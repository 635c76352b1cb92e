//! # Taskdeck Shared Library
//!
//! This crate contains the types and business logic shared between the
//! Taskdeck API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, tasks) and the task ordering rules
//! - `auth`: JWT tokens, password hashing, and the request auth guard
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
