//! Application state and router builder.
//!
//! The router mounts the public endpoints (`/health`, `/register`,
//! `/login`) and a protected group (`/profile`, `/tasks...`) behind a
//! single auth layer. The layer runs the full verification chain from
//! `taskdeck_shared::auth::middleware` and injects the resolved
//! [`CurrentUser`] into request extensions; handlers never repeat the
//! checks themselves.

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::authenticate;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the configured token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.config.jwt.ttl_seconds)
    }
}

/// Builds the complete Axum router with all routes and middleware.
///
/// ```text
/// /
/// ├── GET  /health               # public
/// ├── POST /register             # public
/// ├── POST /login                # public
/// ├── GET  /profile              # auth
/// ├── GET  /tasks?status=        # auth
/// ├── POST /tasks                # auth
/// ├── GET  /tasks/stats          # auth
/// ├── GET  /tasks/upcoming       # auth
/// ├── PUT  /tasks/:id            # auth
/// ├── DELETE /tasks/:id          # auth
/// └── PUT  /tasks/:id/status     # auth
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/stats", get(routes::tasks::task_stats))
        .route("/tasks/upcoming", get(routes::tasks::upcoming_tasks))
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/status", put(routes::tasks::update_task_status))
        // route_layer, not layer: the guard must only run on matched
        // routes, so unknown paths still fall through to the 404 fallback.
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware layer.
///
/// Runs the bearer-token guard and injects the resolved user identity
/// into request extensions. On any failure the wrapped handler never
/// executes.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
