//! Business logic for the proxy pipeline.

pub mod classifier;
pub mod credentials;
pub mod forwarder;
pub mod gate;
pub mod normalizer;
pub mod proxy_service;

pub use classifier::{classify, classify_request, ReasoningMethod};
pub use credentials::CredentialResolver;
pub use forwarder::{UpstreamExchange, UpstreamForwarder};
pub use gate::GateDecision;
pub use proxy_service::{ProxyResponse, ProxyService};
