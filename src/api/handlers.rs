//! HTTP request handlers for the proxy.
//!
//! The proxy handler adapts an axum request into an [`InboundRequest`], runs
//! the pipeline and converts the envelope back. Method gating happens inside
//! the pipeline, so the route accepts every method.

use crate::api::disconnect::DisconnectGuard;
use crate::api::models::InboundRequest;
use crate::core::cancel::CancelHandle;
use crate::core::config::AppConfig;
use crate::core::middleware::ReasoningMethodTag;
use crate::core::{ProxyError, Result};
use crate::services::{ProxyResponse, ProxyService};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub proxy_service: ProxyService,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let proxy_service = ProxyService::new(&config, http_client);
        Self {
            config,
            proxy_service,
        }
    }
}

/// Create the pooled HTTP client used for upstream calls.
///
/// No client-level timeout is set; the forwarder enforces the deadline itself.
pub fn create_http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.upstream.verify_ssl)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}

/// Proxy a chat completion request to the upstream.
///
/// The pipeline runs on its own task; a client disconnect drops this future
/// and the [`DisconnectGuard`] cancels the upstream call.
#[tracing::instrument(skip_all, fields(method = %method))]
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = InboundRequest {
        method,
        headers,
        body: (!body.is_empty()).then_some(body),
    };

    let cancel = CancelHandle::new();
    let guard = DisconnectGuard::new(cancel.clone());
    let service = state.proxy_service.clone();
    let task = tokio::spawn(
        async move { service.handle_with_cancel(request, &cancel).await }
            .instrument(tracing::Span::current()),
    );

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Proxy task failed");
            ProxyResponse {
                envelope: ProxyError::Internal("Proxy task failed".to_string()).into_envelope(),
                reasoning_method: None,
            }
        }
    };
    guard.disarm();

    let mut response = outcome.envelope.into_response();
    if let Some(reasoning_method) = outcome.reasoning_method {
        response
            .extensions_mut()
            .insert(ReasoningMethodTag(reasoning_method));
    }
    response
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "api_key_configured": state.proxy_service.credentials().is_configured()
    }))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_client() {
        let config = AppConfig::default();
        assert!(create_http_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_metrics_handler_text_format() {
        crate::core::init_metrics();
        let response = metrics_handler().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
