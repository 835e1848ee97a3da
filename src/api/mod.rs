//! API layer for the Fireworks proxy.
//!
//! HTTP handlers, request/response models and the router that ties them
//! together.

pub mod disconnect;
pub mod handlers;
pub mod models;

pub use disconnect::DisconnectGuard;
pub use handlers::{create_http_client, health, metrics_handler, proxy_handler, AppState};
pub use models::{
    ChatCompletionRequest, ChatMessage, InboundRequest, PerformanceMetadata, ResponseEnvelope,
};

use crate::core::MetricsMiddleware;
use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Paths served by the proxy handler.
///
/// `/.netlify/functions/api-proxy` keeps existing frontends working unchanged.
pub const PROXY_PATHS: &[&str] = &[
    "/api-proxy",
    "/.netlify/functions/api-proxy",
    "/v1/chat/completions",
];

/// Build router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut proxy_routes = Router::new();
    for path in PROXY_PATHS {
        proxy_routes = proxy_routes.route(path, any(proxy_handler));
    }

    Router::new()
        .merge(proxy_routes)
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
