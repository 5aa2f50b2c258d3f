//! FastTrack Service - HTTP API for trip booking and dispatch
//!
//! This is the main entry point for the fasttrack service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fasttrack_service::{create_router, AppState, ServiceConfig};
use fasttrack_store::{Database, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fasttrack=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FastTrack Service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        db_max_connections = config.db_max_connections,
        "Service configuration loaded"
    );

    tracing::info!(url = %config.database_url, "Opening SQLite database");
    let db = Database::connect(&config.database_url, config.db_max_connections).await?;
    db.initialize().await?;
    let store = Arc::new(SqliteStore::new(db));

    let state = AppState::new(store, config.clone());

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
