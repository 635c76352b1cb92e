//! JWT session token issuance and validation.
//!
//! Tokens are signed with HS256 (HMAC-SHA256) and carry the user's identity
//! plus an expiry. The signing secret and token lifetime are process-wide
//! configuration, loaded once at startup.
//!
//! Verification surfaces exactly two failure classes: [`JwtError::Expired`]
//! for a token past its `exp`, and [`JwtError::Invalid`] for everything else
//! (bad signature, malformed payload, wrong issuer). Callers cannot tell a
//! forged signature apart from a tampered payload.
//!
//! # Example
//!
//! ```
//! use taskdeck_shared::auth::jwt::{create_token, validate_token, Claims};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-secret-key-at-least-32-bytes-long!";
//! let claims = Claims::new(Uuid::new_v4(), "alice", Duration::seconds(3600));
//! let token = create_token(&claims, secret)?;
//!
//! let verified = validate_token(&token, secret)?;
//! assert_eq!(verified.username, "alice");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim pinned into every token.
const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Token failed validation (signature, payload, or issuer)
    #[error("Invalid token")]
    Invalid,
}

/// JWT claims carried by a session token.
///
/// # Claims
///
/// - `sub`: user ID
/// - `username`: username at issuance time (display convenience; the
///   authoritative record is re-read from the store on every request)
/// - `iss`: always `"taskdeck"`
/// - `iat` / `exp`: Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Username at issuance time
    pub username: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `ttl` from now.
    pub fn new(user_id: Uuid, username: &str, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the token has already expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a compact JWT string.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims.
///
/// Verifies the HS256 signature, the `exp` claim, and the issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past its expiry
/// - `JwtError::Invalid` for any other failure; the exact cause is not
///   exposed to callers
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid,
    })?;

    Ok(token_data.claims)
}
