//! board-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and server-sent event endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use board_gateway::api;
use board_gateway::app_state::AppState;
use board_gateway::auth::HeaderAuthenticator;
use board_gateway::config::{BoardConfig, LogFormat};
use board_gateway::domain::{BroadcastHub, MessageStore};
use board_gateway::persistence::{ListBackend, MemoryListBackend, PostgresListBackend};
use board_gateway::service::MessageService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = BoardConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting board-gateway");

    // Build persistence layer
    let backend: Arc<dyn ListBackend> = if config.persistence_enabled {
        let pg = PostgresListBackend::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        tracing::info!("persistence enabled (PostgreSQL)");
        Arc::new(pg)
    } else {
        tracing::warn!("persistence disabled, messages are kept in memory only");
        Arc::new(MemoryListBackend::new())
    };

    // Build domain layer
    let store = Arc::new(
        MessageStore::load(backend)
            .await
            .context("loading message list")?,
    );
    let hub = BroadcastHub::new(config.subscriber_buffer);
    let heartbeat = hub.spawn_heartbeat(config.heartbeat_interval());

    // Build service layer
    let message_service = Arc::new(MessageService::new(store, hub.clone()));

    // Build application state and router
    let app_state = AppState::new(message_service, Arc::new(HeaderAuthenticator::new()));
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await?;

    heartbeat.abort();
    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C after closing every subscription, so open event
/// streams do not hold graceful shutdown open.
async fn shutdown_signal(hub: BroadcastHub) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    hub.close_all();
}
