//! Method gating and CORS preflight.

use axum::http::Method;

/// What to do with an inbound request before any upstream work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Answer the CORS preflight and stop
    Preflight,
    /// Reject with 405 and stop
    Reject,
    /// Continue down the pipeline
    Forward,
}

/// Decide eligibility from the request method alone.
///
/// # Examples
///
/// ```
/// use axum::http::Method;
/// use fireworks_proxy::services::gate::{check, GateDecision};
///
/// assert_eq!(check(&Method::OPTIONS), GateDecision::Preflight);
/// assert_eq!(check(&Method::POST), GateDecision::Forward);
/// assert_eq!(check(&Method::GET), GateDecision::Reject);
/// ```
pub fn check(method: &Method) -> GateDecision {
    if *method == Method::OPTIONS {
        GateDecision::Preflight
    } else if *method == Method::POST {
        GateDecision::Forward
    } else {
        GateDecision::Reject
    }
}
