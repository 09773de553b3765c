//! room-relay server entry point.
//!
//! Binds the listening socket, then serves the relay and HTTP endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use room_relay::app_state::AppState;
use room_relay::build_app;
use room_relay::config::RelayConfig;
use room_relay::service::SessionRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting room-relay");

    // Build service layer
    let app_state = AppState {
        router: Arc::new(SessionRouter::new(config.announce_usernames)),
        outbound_queue_capacity: config.outbound_queue_capacity,
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, build_app(app_state))
        .await
        .context("server error")?;

    Ok(())
}
