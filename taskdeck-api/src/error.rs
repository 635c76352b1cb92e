//! Error handling for the API server.
//!
//! All handlers return `Result<T, ApiError>`; the error converts to an
//! HTTP response with a JSON body of the form `{"error": "<message>"}`.
//! No stack traces or internal detail ever reach the client: internal
//! errors are logged server-side and surfaced as a generic message.
//!
//! Status mapping:
//! - `BadRequest` / `Conflict` -> 400 (duplicate username/email is a 400
//!   in this API, not a 409)
//! - `Unauthorized` -> 401
//! - `NotFound` -> 404 (also used for "exists but not yours")
//! - `Internal` -> 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::auth::{jwt::JwtError, middleware::AuthError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource missing or not owned by the caller (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate username/email (400)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500); message is logged, not exposed
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body: `{"error": "<human message>"}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("Username or email already taken".to_string())
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth guard errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Invalid => ApiError::Unauthorized("Invalid token".to_string()),
            JwtError::CreateError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}
