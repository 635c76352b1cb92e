//! Authentication endpoints.
//!
//! # Endpoints
//!
//! - `POST /register` - Create an account, returns a token + user
//! - `POST /login` - Authenticate, returns a token + user
//! - `GET /profile` - The authenticated caller's identity

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::CurrentUser,
        password,
    },
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password (minimum 6 characters)
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    #[serde(default)]
    pub username: String,

    /// Password
    #[serde(default)]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,
}

/// Response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed session token
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Picks the first validation message, checking fields in a fixed order
/// so the surfaced error is stable.
fn validation_message(errors: &ValidationErrors, fields: &[&str]) -> String {
    let by_field = errors.field_errors();
    for field in fields {
        if let Some(errs) = by_field.get(*field) {
            if let Some(msg) = errs.iter().find_map(|e| e.message.as_ref()) {
                return msg.to_string();
            }
        }
    }
    "Validation failed".to_string()
}

/// Register a new user.
///
/// # Errors
///
/// - `400 Bad Request`: missing field, short password, or duplicate
///   username/email
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(|e| {
        ApiError::BadRequest(validation_message(&e, &["username", "email", "password"]))
    })?;

    // Pre-check duplicates for a friendly message; the unique constraints
    // remain the backstop under concurrency.
    if User::find_by_username_or_email(&state.db, &req.username, &req.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Username or email already taken".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let claims = Claims::new(user.id, &user.username, state.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

/// Login with username and password.
///
/// # Errors
///
/// - `400 Bad Request`: missing username or password
/// - `401 Unauthorized`: unknown user or wrong password (same message
///   for both)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = Claims::new(user.id, &user.username, state.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

/// The authenticated caller's identity.
pub async fn profile(Extension(user): Extension<CurrentUser>) -> ApiResult<Json<UserResponse>> {
    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation_short_password() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let msg = validation_message(&errors, &["username", "email", "password"]);
        assert_eq!(msg, "Password must be at least 6 characters");
    }

    #[test]
    fn test_register_validation_missing_username_wins() {
        let req = RegisterRequest {
            username: String::new(),
            email: String::new(),
            password: String::new(),
        };
        let errors = req.validate().unwrap_err();
        // Fields are checked in a fixed order, so the username error surfaces
        let msg = validation_message(&errors, &["username", "email", "password"]);
        assert_eq!(msg, "Username is required");
    }

    #[test]
    fn test_register_validation_missing_email() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: String::new(),
            password: "secret123".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let msg = validation_message(&errors, &["username", "email", "password"]);
        assert_eq!(msg, "Email is required");
    }

    #[test]
    fn test_register_validation_ok() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
