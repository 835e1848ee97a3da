//! Prometheus metrics for monitoring the proxy.
//!
//! All values live in the process-wide default registry and are exposed on
//! `/metrics`; nothing is persisted.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, status and reasoning method
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream exchange latency in seconds by outcome
    pub upstream_latency: HistogramVec,

    /// Errors by category
    pub error_count: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// Subsequent calls return the same instance.
///
/// # Examples
///
/// ```no_run
/// use fireworks_proxy::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.error_count.with_label_values(&["timeout"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "fireworks_proxy_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code", "reasoning_method"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "fireworks_proxy_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "fireworks_proxy_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_latency = register_histogram_vec!(
            "fireworks_proxy_upstream_latency_seconds",
            "Upstream exchange latency in seconds",
            &["outcome"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register upstream_latency metric");

        let error_count = register_int_counter_vec!(
            "fireworks_proxy_errors_total",
            "Total number of errors by category",
            &["category"]
        )
        .expect("Failed to register error_count metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_latency,
            error_count,
        }
    })
}

/// Get the global metrics instance, registering it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}
