//! Fireworks Proxy - keeps the Fireworks API key on the server
//!
//! A small reverse proxy between a browser client and the Fireworks chat
//! completion API:
//!
//! - **Credential injection**: the bearer key is read once at startup and never
//!   leaves the server
//! - **Method/CORS gating**: `OPTIONS` preflight, `POST` only
//! - **Bounded wait**: each upstream call is cancelled after a deadline (120s)
//! - **Normalized envelopes**: every outcome maps to one JSON shape
//! - **Reasoning telemetry**: requests are labelled Standard / CoD / CoT and the
//!   label plus latency are attached to successful replies
//!
//! # Architecture
//!
//! - [`core`]: config, errors, cancellation, logging, metrics, middleware
//! - [`api`]: HTTP handlers, models and the router
//! - [`services`]: the pipeline stages and [`ProxyService`] which runs them
//!
//! # Configuration
//!
//! - `FIREWORKS_API_KEY`: upstream credential (requests fail with 500 without it)
//! - `HOST` / `PORT`: bind address (default 0.0.0.0:18000)
//! - `UPSTREAM_URL`: chat completion endpoint (default Fireworks)
//! - `UPSTREAM_TIMEOUT_SECS`: upstream deadline (default 120)
//! - `VERIFY_SSL`: verify upstream certificates (default true)

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState, InboundRequest, ResponseEnvelope};
pub use core::{AppConfig, ProxyError, Result};
pub use services::{ProxyService, ReasoningMethod};
