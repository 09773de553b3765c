//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::SessionRouter;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session router owning the connection registry.
    pub router: Arc<SessionRouter>,
    /// Outbound queue size given to each new connection.
    pub outbound_queue_capacity: usize,
}
