//! Configuration management for the Fireworks proxy.
//!
//! Configuration is read once at process start from environment variables
//! (optionally seeded from a `.env` file) and then shared read-only with every
//! request handler.

use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the upstream bearer credential.
pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";

/// Fireworks chat completion endpoint.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.fireworks.ai/inference/v1/chat/completions";

/// Upstream bearer credential.
///
/// `Debug` is redacted and there is no `Display` impl, so the value cannot end
/// up in a log line or a response body by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Blank keys are rejected.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw key for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Upstream endpoint settings
    pub upstream: UpstreamConfig,

    /// Upstream credential, `None` when not configured
    pub api_key: Option<ApiKey>,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream inference endpoint configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Full chat completion URL
    pub url: String,

    /// Deadline for a single upstream exchange, in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: default_timeout_secs(),
            verify_ssl: true,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    18000
}

// Sits just under the 2 minute execution ceiling of common serverless hosts.
fn default_timeout_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fireworks_proxy::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Missing variables fall back to defaults. Malformed numeric values are
    /// reported as errors rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config.server.host = host;
        }

        if let Some(port_str) = lookup("PORT") {
            config.server.port = port_str
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port_str))?;
        }

        if let Some(url) = lookup("UPSTREAM_URL").filter(|u| !u.trim().is_empty()) {
            config.upstream.url = url.trim().to_string();
        }

        if let Some(timeout_str) = lookup("UPSTREAM_TIMEOUT_SECS") {
            let timeout = timeout_str
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS value: {}", timeout_str))?;
            if timeout == 0 {
                anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
            }
            config.upstream.timeout_secs = timeout;
        }

        if let Some(verify_ssl_str) = lookup("VERIFY_SSL") {
            config.upstream.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        config.api_key = lookup(API_KEY_ENV).and_then(ApiKey::new);

        Ok(config)
    }
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
