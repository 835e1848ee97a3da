//! Core functionality for the Fireworks proxy.
//!
//! - Configuration management
//! - Error handling
//! - Cancellation
//! - Logging context
//! - Metrics collection
//! - HTTP middleware

pub mod cancel;
pub mod config;
pub mod error;
pub mod error_types;
pub mod logging;
pub mod metrics;
pub mod middleware;

// Re-export commonly used types
pub use cancel::CancelHandle;
pub use config::{ApiKey, AppConfig, ServerConfig, UpstreamConfig};
pub use error::{ProxyError, Result};
pub use error_types::ErrorCategory;
pub use logging::{generate_request_id, get_request_id, init_tracing, REQUEST_ID};
pub use metrics::{get_metrics, init_metrics, Metrics};
pub use middleware::{MetricsMiddleware, ReasoningMethodTag};
