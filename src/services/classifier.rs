//! Request body decoding and reasoning-method classification.
//!
//! Classification is telemetry only: it reads the decoded body and never
//! changes what gets forwarded.

use crate::core::{ProxyError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

const CHAIN_OF_DRAFT_MARKER: &str = "Chain of Draft";
const CHAIN_OF_THOUGHT_MARKER: &str = "Chain of Thought";

/// Prompting strategy detected in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReasoningMethod {
    #[serde(rename = "Standard")]
    Standard,
    #[serde(rename = "CoD")]
    ChainOfDraft,
    #[serde(rename = "CoT")]
    ChainOfThought,
}

impl ReasoningMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::ChainOfDraft => "CoD",
            Self::ChainOfThought => "CoT",
        }
    }
}

impl fmt::Display for ReasoningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify prompt text by case-sensitive substring match.
///
/// Chain of Draft wins when both markers are present.
///
/// # Examples
///
/// ```
/// use fireworks_proxy::services::classifier::{classify, ReasoningMethod};
///
/// assert_eq!(classify("Use Chain of Draft reasoning"), ReasoningMethod::ChainOfDraft);
/// assert_eq!(classify("Chain of Thought"), ReasoningMethod::ChainOfThought);
/// assert_eq!(classify("chain of thought"), ReasoningMethod::Standard);
/// ```
pub fn classify(text: &str) -> ReasoningMethod {
    if text.contains(CHAIN_OF_DRAFT_MARKER) {
        ReasoningMethod::ChainOfDraft
    } else if text.contains(CHAIN_OF_THOUGHT_MARKER) {
        ReasoningMethod::ChainOfThought
    } else {
        ReasoningMethod::Standard
    }
}

/// Classify a decoded request body from `messages[0].content`.
///
/// Anything that is not a string at that position yields `Standard`.
pub fn classify_request(body: &Value) -> ReasoningMethod {
    body.pointer("/messages/0/content")
        .and_then(Value::as_str)
        .map(classify)
        .unwrap_or(ReasoningMethod::Standard)
}

/// Decode the raw request body.
///
/// An absent or empty body is `MissingBody`; anything that fails to decode as
/// UTF-8 JSON is `InvalidBody`.
pub fn parse_body(raw: Option<&[u8]>) -> Result<Value> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ProxyError::MissingBody),
    };

    serde_json::from_slice(raw).map_err(|e| {
        tracing::warn!(error = %e, "Rejected request body that is not valid JSON");
        ProxyError::InvalidBody(e.to_string())
    })
}
