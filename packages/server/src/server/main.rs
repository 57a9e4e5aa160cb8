// Main entry point for the QA Resource Hub API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hub_core::{
    kernel::{HttpIdentityProvider, PostgresKvStore, ServerDeps},
    server::build_app,
    Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hub_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QA Resource Hub API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire up dependencies
    let store = Arc::new(PostgresKvStore::new(pool));
    let identity = Arc::new(HttpIdentityProvider::new(
        config.identity_provider_url.clone(),
        config.identity_provider_key.clone(),
        Duration::from_secs(config.identity_timeout_secs),
    ));
    let deps = ServerDeps::new(store, identity, config.admin_secret.clone());

    let (app, service) = build_app(deps);

    // Repair pass: rebuild pending indices from the stored records in
    // case a previous run crashed between a record write and its index
    // writes.
    match service.rebuild_pending_indices().await {
        Ok(indexed) => tracing::info!(indexed, "Pending indices rebuilt"),
        Err(e) => tracing::warn!(error = %e, "Pending index rebuild failed"),
    }

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
