//! Configuration management for the API server.
//!
//! Configuration is loaded from environment variables into an explicit
//! struct once at startup and passed by reference to the services that
//! need it; there is no global mutable configuration.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `DATABASE_CONNECT_MAX_RETRIES`: startup connection attempts (default: 10)
//! - `DATABASE_CONNECT_RETRY_DELAY_SECONDS`: delay between attempts (default: 2)
//! - `API_HOST`: host to bind to (default: 0.0.0.0)
//! - `API_PORT`: port to bind to (default: 8080)
//! - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
//! - `JWT_SECRET`: secret key for token signing (required, >= 32 bytes)
//! - `JWT_TTL_SECONDS`: token lifetime (default: 3600)

use serde::{Deserialize, Serialize};
use std::env;
use taskdeck_shared::db::pool;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; a single "*" means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Startup connection attempts before aborting
    pub connect_max_retries: u32,

    /// Delay between startup connection attempts (seconds)
    pub connect_retry_delay_seconds: u64,
}

impl DatabaseConfig {
    /// Converts to the pool-layer configuration.
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            connect_max_retries: self.connect_max_retries,
            connect_retry_delay_seconds: self.connect_retry_delay_seconds,
            ..pool::DatabaseConfig::default()
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let connect_max_retries = env::var("DATABASE_CONNECT_MAX_RETRIES")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let connect_retry_delay_seconds = env::var("DATABASE_CONNECT_RETRY_DELAY_SECONDS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u64>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_ttl_seconds = env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                connect_max_retries,
                connect_retry_delay_seconds,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_seconds: jwt_ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
