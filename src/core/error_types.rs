//! Shared constants for the proxy's error envelopes and error categories.

use std::fmt;

pub const ERROR_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const ERROR_API_KEY_NOT_CONFIGURED: &str = "API key not configured on server";
pub const ERROR_BODY_REQUIRED: &str = "Request body is required";
pub const ERROR_BAD_REQUEST: &str = "Bad Request";
pub const ERROR_GATEWAY_TIMEOUT: &str = "Gateway Timeout";
pub const ERROR_INTERNAL: &str = "Internal Server Error";
pub const ERROR_API_PREFIX: &str = "API Error";

pub const MESSAGE_INVALID_BODY: &str = "Invalid request body";
pub const MESSAGE_CONNECT_FAILED: &str = "Failed to connect to upstream provider";
pub const MESSAGE_UPSTREAM_FAILED: &str = "Upstream request failed";
pub const MESSAGE_INVALID_UPSTREAM_JSON: &str = "Invalid JSON response from upstream provider";
pub const MESSAGE_CANCELLED: &str = "Upstream request was cancelled before it completed";

pub const ERROR_CATEGORY_CLIENT_PROTOCOL: &str = "client_protocol";
pub const ERROR_CATEGORY_CONFIGURATION: &str = "configuration";
pub const ERROR_CATEGORY_UPSTREAM: &str = "upstream";
pub const ERROR_CATEGORY_TIMEOUT: &str = "timeout";
pub const ERROR_CATEGORY_NETWORK: &str = "network";
pub const ERROR_CATEGORY_CANCELLED: &str = "cancelled";
pub const ERROR_CATEGORY_INTERNAL: &str = "internal";

/// Coarse error class, used as a log field and a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ClientProtocol,
    Configuration,
    Upstream,
    Timeout,
    Network,
    Cancelled,
    Internal,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientProtocol => ERROR_CATEGORY_CLIENT_PROTOCOL,
            Self::Configuration => ERROR_CATEGORY_CONFIGURATION,
            Self::Upstream => ERROR_CATEGORY_UPSTREAM,
            Self::Timeout => ERROR_CATEGORY_TIMEOUT,
            Self::Network => ERROR_CATEGORY_NETWORK,
            Self::Cancelled => ERROR_CATEGORY_CANCELLED,
            Self::Internal => ERROR_CATEGORY_INTERNAL,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
