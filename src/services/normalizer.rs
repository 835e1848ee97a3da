//! Maps upstream outcomes into the proxy's response envelope.

use crate::api::models::{PerformanceMetadata, ResponseEnvelope, CACHE_CONTROL_NO_STORE};
use crate::services::classifier::ReasoningMethod;
use crate::services::forwarder::UpstreamExchange;
use axum::http::{header, HeaderValue, StatusCode};
use serde_json::Value;

/// Render an upstream exchange as an envelope.
pub fn normalize(exchange: UpstreamExchange, reasoning_method: ReasoningMethod) -> ResponseEnvelope {
    let performance = PerformanceMetadata {
        response_time_ms: exchange.elapsed_ms(),
        reasoning_method,
    };

    match exchange.result {
        Ok(body) => success(body, performance),
        Err(error) => error.into_envelope(),
    }
}

/// 200 envelope for a relayed upstream reply, annotated with `performance`.
pub fn success(body: Value, performance: PerformanceMetadata) -> ResponseEnvelope {
    let body = attach_performance(body, performance);
    ResponseEnvelope::json(StatusCode::OK, &body).with_header(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
    )
}

/// Inject the `performance` block into an upstream body.
///
/// Bodies that carry an `error` key, or are not JSON objects, are returned
/// untouched.
pub fn attach_performance(body: Value, performance: PerformanceMetadata) -> Value {
    match body {
        Value::Object(mut map) if !map.contains_key("error") => {
            match serde_json::to_value(performance) {
                Ok(perf) => {
                    map.insert("performance".to_string(), perf);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize performance metadata");
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProxyError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn perf(ms: u64, method: ReasoningMethod) -> PerformanceMetadata {
        PerformanceMetadata {
            response_time_ms: ms,
            reasoning_method: method,
        }
    }

    #[test]
    fn test_attach_performance() {
        let body = json!({ "choices": [{ "message": { "content": "4" } }] });
        let annotated = attach_performance(body, perf(12, ReasoningMethod::ChainOfDraft));
        assert_eq!(
            annotated,
            json!({
                "choices": [{ "message": { "content": "4" } }],
                "performance": { "response_time_ms": 12, "reasoning_method": "CoD" }
            })
        );
    }

    #[test]
    fn test_error_body_left_untouched() {
        let body = json!({ "error": { "message": "model overloaded" } });
        let annotated = attach_performance(body.clone(), perf(5, ReasoningMethod::Standard));
        assert_eq!(annotated, body);
    }

    #[test]
    fn test_non_object_body_left_untouched() {
        let body = json!([1, 2, 3]);
        assert_eq!(
            attach_performance(body.clone(), perf(5, ReasoningMethod::Standard)),
            body
        );
    }

    #[test]
    fn test_success_envelope_headers() {
        let envelope = success(json!({ "choices": [] }), perf(1, ReasoningMethod::Standard));
        assert_eq!(envelope.status, StatusCode::OK);
        assert_eq!(
            envelope.headers.get(header::CACHE_CONTROL).unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(
            envelope.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            envelope
                .headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[test]
    fn test_normalize_success_uses_elapsed() {
        let exchange = UpstreamExchange {
            elapsed: Duration::from_millis(1234),
            result: Ok(json!({ "choices": [] })),
        };
        let envelope = normalize(exchange, ReasoningMethod::ChainOfThought);
        let body = envelope.body_json().unwrap();
        assert_eq!(body["performance"]["response_time_ms"], 1234);
        assert_eq!(body["performance"]["reasoning_method"], "CoT");
    }

    #[test]
    fn test_normalize_failure_has_no_cache_header() {
        let exchange = UpstreamExchange {
            elapsed: Duration::from_millis(10),
            result: Err(ProxyError::Timeout { timeout_secs: 120 }),
        };
        let envelope = normalize(exchange, ReasoningMethod::Standard);
        assert_eq!(envelope.status, StatusCode::GATEWAY_TIMEOUT);
        assert!(envelope.headers.get(header::CACHE_CONTROL).is_none());
        assert!(envelope.body_json().unwrap().get("performance").is_none());
    }
}
