//! # room-relay
//!
//! Real-time WebSocket room relay. Clients connect, join a named room, and
//! exchange short text messages that are fanned out to every other member
//! of that room.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── WS Handler + connection loop (ws/)
//!     ├── Envelope codec (ws::messages)
//!     │
//!     ├── SessionRouter (service/)
//!     │
//!     ├── ConnectionRegistry + RoomBroadcaster (domain/)
//!     │
//!     └── Health / stats endpoints (api/)
//! ```
//!
//! State is in memory only: restarting the process drops every connection
//! and room.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application router: the relay socket at `/ws` and `/`,
/// plus the HTTP endpoints from [`api::build_router`].
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
