//! # TaskDeck API Server
//!
//! HTTP backend for the TaskDeck board: account registration and login,
//! bearer-token sessions, and per-user task management with board
//! ordering, schedule stats, and an upcoming-week report.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdeck-api
//! ```
//!
//! Configuration comes from the environment (see `config.rs`); a `.env`
//! file is honored in development.

use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::db::{migrations::run_migrations, pool::create_pool_with_retry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskDeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // The database may come up after the API in orchestrated deployments,
    // so the initial connect retries before giving up.
    let pool = create_pool_with_retry(&config.database.pool_config()).await?;
    tracing::info!("Database connection established");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
