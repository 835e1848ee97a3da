//! Upstream credential resolution.

use crate::core::config::{ApiKey, API_KEY_ENV};
use crate::core::{ProxyError, Result};

/// Resolves the upstream bearer credential injected at process start.
///
/// The key is borrowed for a single invocation; it is never copied into a
/// response and never logged.
#[derive(Clone, Default)]
pub struct CredentialResolver {
    api_key: Option<ApiKey>,
}

impl CredentialResolver {
    pub fn new(api_key: Option<ApiKey>) -> Self {
        Self { api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fails closed when no key is configured.
    pub fn resolve(&self) -> Result<&ApiKey> {
        self.api_key.as_ref().ok_or_else(|| {
            tracing::error!(
                variable = API_KEY_ENV,
                "Upstream API key is not configured; refusing to forward"
            );
            ProxyError::MissingApiKey
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_configured_key() {
        let resolver = CredentialResolver::new(ApiKey::new("fw-key"));
        assert!(resolver.is_configured());
        assert_eq!(resolver.resolve().unwrap().expose(), "fw-key");
    }

    #[test]
    fn test_resolve_missing_key() {
        let resolver = CredentialResolver::new(None);
        assert!(!resolver.is_configured());
        assert!(matches!(resolver.resolve(), Err(ProxyError::MissingApiKey)));
    }

    #[test]
    fn test_blank_key_never_configured() {
        let resolver = CredentialResolver::new(ApiKey::new("  "));
        assert!(matches!(resolver.resolve(), Err(ProxyError::MissingApiKey)));
    }
}
