//! HTTP middleware for request tracking and metrics.

use crate::core::metrics::get_metrics;
use crate::services::classifier::ReasoningMethod;
use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::Response,
};
use prometheus::Gauge;
use std::time::Instant;

/// Extension type for storing the detected reasoning method in a response
#[derive(Clone, Copy, Debug)]
pub struct ReasoningMethodTag(pub ReasoningMethod);

/// Label used when no reasoning method was detected (preflight, rejected method, ...)
const NO_REASONING_METHOD: &str = "none";

/// Label for any method outside the standard set
const OTHER_METHOD: &str = "other";

/// Fixed label for a request method.
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => OTHER_METHOD,
    }
}

/// Decrements the active request gauge when dropped, including when the
/// request future is dropped mid-flight.
struct ActiveRequestGuard {
    gauge: Gauge,
}

impl ActiveRequestGuard {
    fn new(gauge: Gauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

/// Middleware for tracking request metrics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track metrics for incoming requests.
    ///
    /// Only requests that matched a route are recorded, labelled by the route
    /// pattern rather than the raw path. Records the request count by status
    /// code and reasoning method (read from the [`ReasoningMethodTag`]
    /// response extension set by the proxy handler).
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let endpoint = match request.extensions().get::<MatchedPath>() {
            Some(matched) => matched.as_str().to_string(),
            None => return next.run(request).await,
        };

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let method = method_label(request.method());
        let metrics = get_metrics();
        let _active = ActiveRequestGuard::new(
            metrics.active_requests.with_label_values(&[&endpoint]),
        );

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();

        let status_code = response.status().as_u16().to_string();
        let reasoning_method = response
            .extensions()
            .get::<ReasoningMethodTag>()
            .map(|tag| tag.0.as_str())
            .unwrap_or(NO_REASONING_METHOD);

        metrics
            .request_count
            .with_label_values(&[method, &endpoint, &status_code, reasoning_method])
            .inc();
        metrics
            .request_duration
            .with_label_values(&[method, &endpoint])
            .observe(duration);

        tracing::info!(
            "{} {} - status={} reasoning={} duration={:.3}s",
            method,
            endpoint,
            status_code,
            reasoning_method,
            duration
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_standard() {
        assert_eq!(method_label(&Method::POST), "POST");
        assert_eq!(method_label(&Method::OPTIONS), "OPTIONS");
        assert_eq!(method_label(&Method::GET), "GET");
    }

    #[test]
    fn test_method_label_extension_methods() {
        for name in ["PURGE", "BREW", "X-ANYTHING"] {
            let method = Method::from_bytes(name.as_bytes()).unwrap();
            assert_eq!(method_label(&method), "other");
        }
    }

    #[test]
    fn test_active_guard_decrements_on_drop() {
        let gauge = get_metrics()
            .active_requests
            .with_label_values(&["/guard-test"]);
        let before = gauge.get();

        let guard = ActiveRequestGuard::new(gauge.clone());
        assert_eq!(gauge.get(), before + 1.0);

        drop(guard);
        assert_eq!(gauge.get(), before);
    }

    #[tokio::test]
    async fn test_active_guard_released_when_future_dropped() {
        let gauge = get_metrics()
            .active_requests
            .with_label_values(&["/guard-abort-test"]);

        let held = gauge.clone();
        let task = tokio::spawn(async move {
            let _active = ActiveRequestGuard::new(held);
            std::future::pending::<()>().await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(gauge.get(), 1.0);

        task.abort();
        let _ = task.await;
        assert_eq!(gauge.get(), 0.0);
    }
}
