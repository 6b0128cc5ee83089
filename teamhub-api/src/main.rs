//! # TeamHub API Server
//!
//! REST backend for team collaboration: user accounts, teams with
//! per-team edit policies, projects, tasks, and task comments.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - JWT authentication (access + refresh tokens)
//! - Team management with member roles and edit policies
//! - Projects and tasks scoped to teams
//! - Task comments
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p teamhub-api
//! ```

use teamhub_api::{app, config::Config};
use teamhub_shared::db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TeamHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and apply pending migrations
    db::migrations::ensure_database_exists(&config.database.url).await?;

    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::migrations::run_migrations(&pool).await?;

    // Build Axum application
    let bind_address = config.bind_address();
    let state = app::AppState::new(pool, config);
    let router = app::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when a shutdown signal arrives
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
