//! Operational HTTP surface: health, counters, and OpenAPI docs.
//!
//! The relay itself speaks WebSocket only; these endpoints are read-only.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "room-relay", description = "Real-time WebSocket room relay"),
    paths(handlers::system::health_handler, handlers::system::stats_handler),
    tags((name = "System", description = "Health and relay counters"))
)]
pub struct ApiDoc;

/// Builds the HTTP router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
