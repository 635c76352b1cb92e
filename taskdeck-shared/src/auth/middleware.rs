//! Bearer-token auth guard.
//!
//! Every protected operation goes through [`authenticate`], which performs
//! the full verification chain in one place rather than per route:
//!
//! 1. Require a `Authorization: Bearer <token>` header
//! 2. Validate the token signature and expiry
//! 3. Resolve the token's user ID to a live user record (catches users
//!    deleted after the token was issued)
//!
//! On success the resolved identity is returned as a [`CurrentUser`], which
//! the API layer inserts into request extensions for handlers to extract.
//! On any failure the wrapped handler never runs.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// The authenticated caller, resolved from the credential store.
///
/// Handlers extract this with Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use taskdeck_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(user): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,
}

/// Error type for the auth guard
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer credential in the authorization header
    #[error("Missing token")]
    MissingToken,

    /// Token past its expiry
    #[error("Token expired")]
    Expired,

    /// Token failed signature or payload validation
    #[error("Invalid token")]
    InvalidToken,

    /// Token was valid but its user no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Credential store lookup failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}

/// Runs the full authentication chain for one request.
///
/// # Errors
///
/// - `AuthError::MissingToken` if there is no bearer credential
/// - `AuthError::Expired` / `AuthError::InvalidToken` from token validation
/// - `AuthError::UserNotFound` if the user record is gone
/// - `AuthError::Database` if the store lookup fails
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<CurrentUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingToken)?;

    let claims = validate_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_error_mapping() {
        assert!(matches!(
            AuthError::from(JwtError::Expired),
            AuthError::Expired
        ));
        assert!(matches!(
            AuthError::from(JwtError::Invalid),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            AuthError::from(JwtError::CreateError("x".to_string())),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthError::MissingToken.to_string(), "Missing token");
        assert_eq!(AuthError::Expired.to_string(), "Token expired");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found");
    }
}
