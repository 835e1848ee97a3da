//! Outbound call to the inference endpoint under a bounded deadline.
//!
//! The request future is raced against a deadline timer and a
//! [`CancelHandle`]. Whichever settles first wins; the losers are dropped,
//! which aborts the in-flight HTTP exchange.

use crate::core::cancel::CancelHandle;
use crate::core::config::{ApiKey, UpstreamConfig};
use crate::core::error_types::{
    MESSAGE_CONNECT_FAILED, MESSAGE_INVALID_UPSTREAM_JSON, MESSAGE_UPSTREAM_FAILED,
};
use crate::core::{ProxyError, Result};
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::error::Error;
use std::time::{Duration, Instant};

/// Result of one upstream exchange plus the measured latency.
#[derive(Debug)]
pub struct UpstreamExchange {
    /// Wall-clock time from dispatch to settlement or cancellation
    pub elapsed: Duration,
    /// Parsed success body, or the classified failure
    pub result: Result<Value>,
}

impl UpstreamExchange {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Short outcome label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match &self.result {
            Ok(_) => "success",
            Err(e) => e.category().as_str(),
        }
    }
}

/// Forwards decoded chat completion bodies to the configured endpoint.
#[derive(Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            timeout: config.timeout(),
        }
    }

    /// Override the deadline (sub-second deadlines are mostly useful in tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward `body` with a fresh cancel handle.
    pub async fn forward(&self, api_key: &ApiKey, body: Bytes) -> UpstreamExchange {
        self.forward_with_cancel(api_key, body, &CancelHandle::new())
            .await
    }

    /// Forward `body` byte for byte, stopping early if `cancel` fires or the
    /// deadline passes.
    ///
    /// On deadline expiry `cancel` is signalled so observers see the call was
    /// abandoned. The returned exchange always carries the elapsed time.
    pub async fn forward_with_cancel(
        &self,
        api_key: &ApiKey,
        body: Bytes,
        cancel: &CancelHandle,
    ) -> UpstreamExchange {
        let started = Instant::now();

        let result = tokio::select! {
            result = self.dispatch(api_key, body) => {
                cancel.mark_settled();
                result
            }
            _ = tokio::time::sleep(self.timeout) => {
                cancel.cancel();
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Upstream request exceeded deadline, cancelled"
                );
                Err(ProxyError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
            _ = cancel.cancelled() => {
                tracing::info!("Upstream request cancelled before completion");
                Err(ProxyError::Cancelled)
            }
        };

        UpstreamExchange {
            elapsed: started.elapsed(),
            result,
        }
    }

    async fn dispatch(&self, api_key: &ApiKey, body: Bytes) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(api_key.expose())
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!(status = %status, "Upstream responded");

        if !status.is_success() {
            return Err(read_upstream_error(response).await);
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::error!(error = %e, "Upstream returned a success status with an undecodable body");
            ProxyError::Network(MESSAGE_INVALID_UPSTREAM_JSON.to_string())
        })
    }

    /// Classify a reqwest transport failure. Client-facing text never carries
    /// the upstream URL or request headers.
    fn transport_error(&self, error: reqwest::Error) -> ProxyError {
        let is_timeout = error.is_timeout();
        let is_connect = error.is_connect();
        let error = error.without_url();
        tracing::error!(
            error = %error,
            error_source = ?error.source(),
            is_timeout,
            is_connect,
            "HTTP request failed to upstream"
        );

        if is_timeout {
            ProxyError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else if is_connect {
            ProxyError::Network(MESSAGE_CONNECT_FAILED.to_string())
        } else {
            ProxyError::Network(MESSAGE_UPSTREAM_FAILED.to_string())
        }
    }
}

/// Capture a non-success upstream reply: status, reason phrase and body
/// (JSON when it parses, raw text otherwise).
async fn read_upstream_error(response: reqwest::Response) -> ProxyError {
    let status = response.status();
    let reason = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string());

    let details = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) => Value::String(format!("Failed to read upstream response: {}", e.without_url())),
    };

    tracing::warn!(
        status = status.as_u16(),
        reason = %reason,
        "Upstream returned an error status"
    );

    ProxyError::Upstream {
        status: status.as_u16(),
        reason,
        details,
    }
}
