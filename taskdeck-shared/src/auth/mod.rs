//! Authentication building blocks.
//!
//! - `jwt`: signed session tokens (issue + verify)
//! - `password`: Argon2id password hashing
//! - `middleware`: the bearer-token auth guard shared by all protected routes

pub mod jwt;
pub mod middleware;
pub mod password;
