//! Database models.
//!
//! - `user`: user accounts (the credential store)
//! - `task`: tasks, their ordering rules, and aggregate stats

pub mod task;
pub mod user;
