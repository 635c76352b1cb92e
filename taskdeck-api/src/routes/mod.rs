//! API route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, and profile
//! - `tasks`: Task CRUD, stats, and upcoming report

pub mod auth;
pub mod health;
pub mod tasks;
