//! The request pipeline.
//!
//! gate → credential → body → classify → forward → normalize. Every stage can
//! short-circuit with a [`ProxyError`], which renders to its own envelope.

use crate::api::models::{ChatCompletionRequest, InboundRequest, ResponseEnvelope};
use crate::core::cancel::CancelHandle;
use crate::core::config::AppConfig;
use crate::core::logging::{generate_request_id, get_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use crate::core::{ProxyError, Result};
use crate::services::classifier::{self, ReasoningMethod};
use crate::services::credentials::CredentialResolver;
use crate::services::forwarder::UpstreamForwarder;
use crate::services::gate::{self, GateDecision};
use crate::services::normalizer;
use axum::http::Method;

/// Envelope plus the telemetry label computed on the way.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub envelope: ResponseEnvelope,
    /// `None` when the request never reached classification
    pub reasoning_method: Option<ReasoningMethod>,
}

/// Runs one invocation of the proxy pipeline.
#[derive(Clone)]
pub struct ProxyService {
    credentials: CredentialResolver,
    forwarder: UpstreamForwarder,
}

impl ProxyService {
    pub fn new(config: &AppConfig, http_client: reqwest::Client) -> Self {
        Self {
            credentials: CredentialResolver::new(config.api_key.clone()),
            forwarder: UpstreamForwarder::new(http_client, &config.upstream),
        }
    }

    pub fn from_parts(credentials: CredentialResolver, forwarder: UpstreamForwarder) -> Self {
        Self {
            credentials,
            forwarder,
        }
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn forwarder(&self) -> &UpstreamForwarder {
        &self.forwarder
    }

    /// Handle one request with a fresh cancel handle.
    pub async fn handle(&self, request: InboundRequest) -> ProxyResponse {
        self.handle_with_cancel(request, &CancelHandle::new()).await
    }

    /// Handle one request. Always returns an envelope; `cancel` aborts the
    /// upstream call if it is still in flight.
    pub async fn handle_with_cancel(
        &self,
        request: InboundRequest,
        cancel: &CancelHandle,
    ) -> ProxyResponse {
        let request_id = generate_request_id();
        let method = request.method.clone();

        REQUEST_ID
            .scope(request_id.clone(), async move {
                let mut reasoning_method = None;
                let envelope = match self.process(request, cancel, &mut reasoning_method).await {
                    Ok(envelope) => envelope,
                    Err(error) => {
                        record_error(&request_id, &method, &error);
                        error.into_envelope()
                    }
                };

                ProxyResponse {
                    envelope,
                    reasoning_method,
                }
            })
            .await
    }

    async fn process(
        &self,
        request: InboundRequest,
        cancel: &CancelHandle,
        reasoning_method: &mut Option<ReasoningMethod>,
    ) -> Result<ResponseEnvelope> {
        match gate::check(&request.method) {
            GateDecision::Preflight => return Ok(ResponseEnvelope::preflight()),
            GateDecision::Reject => {
                return Err(ProxyError::MethodNotAllowed(request.method.to_string()))
            }
            GateDecision::Forward => {}
        }

        let api_key = self.credentials.resolve()?;
        let payload = classifier::parse_body(request.body.as_deref())?;

        let method = classifier::classify_request(&payload);
        *reasoning_method = Some(method);

        if let Some(view) = ChatCompletionRequest::view(&payload) {
            tracing::info!(
                model = view.model.as_deref().unwrap_or("default"),
                messages = view.messages.len(),
                max_tokens = ?view.max_tokens,
                reasoning_method = %method,
                "Forwarding chat completion request"
            );
            if view.stream == Some(true) {
                tracing::warn!("Streaming was requested but replies are relayed as a single JSON body");
            }
        } else {
            tracing::info!(reasoning_method = %method, "Forwarding request with non-standard body");
        }

        // Validated above; the caller's bytes are forwarded untouched.
        let body = request.body.clone().unwrap_or_default();
        let exchange = self
            .forwarder
            .forward_with_cancel(api_key, body, cancel)
            .await;

        let outcome = exchange.outcome();
        get_metrics()
            .upstream_latency
            .with_label_values(&[outcome])
            .observe(exchange.elapsed.as_secs_f64());
        tracing::info!(
            elapsed_ms = exchange.elapsed_ms(),
            outcome,
            reasoning_method = %method,
            "Upstream exchange settled"
        );

        if let Err(error) = &exchange.result {
            record_error(&get_request_id(), &request.method, error);
        }

        Ok(normalizer::normalize(exchange, method))
    }
}

fn record_error(request_id: &str, method: &Method, error: &ProxyError) {
    tracing::warn!(
        request_id = %request_id,
        method = %method,
        category = %error.category(),
        error = %error,
        "Request failed"
    );
    get_metrics()
        .error_count
        .with_label_values(&[error.category().as_str()])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ApiKey, UpstreamConfig};
    use axum::http::{header, StatusCode};
    use serde_json::json;

    fn service_without_upstream(api_key: Option<ApiKey>) -> ProxyService {
        // Nothing listens here; tests using this never reach the forwarder.
        let config = AppConfig {
            upstream: UpstreamConfig {
                url: "http://127.0.0.1:9/unreachable".to_string(),
                ..UpstreamConfig::default()
            },
            api_key,
            ..AppConfig::default()
        };
        ProxyService::new(&config, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_preflight_short_circuits_without_key() {
        let service = service_without_upstream(None);
        let response = service
            .handle(InboundRequest::new(Method::OPTIONS, None))
            .await;

        assert_eq!(response.envelope.status, StatusCode::OK);
        assert!(response.envelope.body.is_empty());
        assert!(response.reasoning_method.is_none());
    }

    #[tokio::test]
    async fn test_get_rejected() {
        let service = service_without_upstream(ApiKey::new("k"));
        let response = service
            .handle(InboundRequest::new(Method::GET, None))
            .await;

        assert_eq!(response.envelope.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.envelope.headers.get(header::ALLOW).unwrap(), "POST");
    }

    #[tokio::test]
    async fn test_missing_key_checked_before_body() {
        let service = service_without_upstream(None);
        let response = service
            .handle(InboundRequest::new(Method::POST, Some("{not json".to_string())))
            .await;

        assert_eq!(response.envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.envelope.body_json().unwrap(),
            json!({ "error": "API key not configured on server" })
        );
    }

    #[tokio::test]
    async fn test_missing_body() {
        let service = service_without_upstream(ApiKey::new("k"));
        let response = service
            .handle(InboundRequest::new(Method::POST, None))
            .await;

        assert_eq!(response.envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.envelope.body_json().unwrap(),
            json!({ "error": "Request body is required" })
        );
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let service = service_without_upstream(ApiKey::new("k"));
        let response = service
            .handle(InboundRequest::new(Method::POST, Some("{not json".to_string())))
            .await;

        assert_eq!(response.envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.envelope.body_json().unwrap(),
            json!({ "error": "Bad Request", "message": "Invalid request body" })
        );
        assert!(response.reasoning_method.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_internal_error() {
        let service = service_without_upstream(ApiKey::new("secret-key"));
        let body = json!({ "messages": [{ "role": "user", "content": "Chain of Thought" }] });
        let response = service
            .handle(InboundRequest::new(Method::POST, Some(body.to_string())))
            .await;

        assert_eq!(response.envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.reasoning_method, Some(ReasoningMethod::ChainOfThought));
        let json = response.envelope.body_json().unwrap();
        assert_eq!(json["error"], "Internal Server Error");
        assert!(!response.envelope.body.contains("secret-key"));
    }
}
