//! Request and response models for the proxy.

use crate::services::classifier::ReasoningMethod;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CORS headers granted on preflight.
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CACHE_CONTROL_NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// One inbound invocation, independent of the hosting surface.
///
/// The body is kept as the raw bytes the caller sent; those exact bytes are
/// what goes upstream.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl InboundRequest {
    pub fn new(method: Method, body: Option<String>) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: body.map(Bytes::from),
        }
    }
}

/// The proxy's single output artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ResponseEnvelope {
    /// JSON envelope with the headers every JSON response carries.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        );
        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }

    /// Empty 200 answering a CORS preflight.
    pub fn preflight() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Decode the body back to JSON. `None` for empty or non-JSON bodies.
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Typed view of a chat completion request body, used for logging.
///
/// The forwarded payload is always the decoded JSON value, never a
/// re-serialization of this struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionRequest {
    /// Lenient typed view; `None` when the body does not fit the shape.
    pub fn view(body: &Value) -> Option<Self> {
        Self::deserialize(body).ok()
    }

    pub fn first_message_text(&self) -> Option<&str> {
        self.messages.first().and_then(ChatMessage::text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl ChatMessage {
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// Timing annotation injected into successful bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceMetadata {
    pub response_time_ms: u64,
    pub reasoning_method: ReasoningMethod,
}
