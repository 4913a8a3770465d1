//! Builder for configuring catalog clients

use std::sync::Arc;
use std::time::Duration;

use super::CatalogClient;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::ClientConfig;
use crate::transport::{ReqwestTransport, Transport};
use crate::{CatalogError, Result};

/// Main entry point for creating catalog clients.
pub struct Marquee;

impl Marquee {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MarqueeBuilder {
        MarqueeBuilder::new()
    }
}

/// Builder for configuring catalog clients.
///
/// ```rust,no_run
/// # use marquee::Marquee;
/// # use std::time::Duration;
/// let client = Marquee::builder()
///     .api_key("tmdb-key")
///     .language("en-GB")
///     .ttl(Duration::from_secs(600))
///     .build()?;
/// # Ok::<(), marquee::CatalogError>(())
/// ```
pub struct MarqueeBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl MarqueeBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
        }
    }

    /// Start from a fully assembled configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// TMDB v3 API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Override the API root (for testing with wiremock, or a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.base_url(url);
        self
    }

    /// Override the image asset host.
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.image_base_url(url);
        self
    }

    /// Response language sent with every request (default: `en-US`).
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config = self.config.language(language);
        self
    }

    /// Time-to-live for cached responses.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config = self.config.default_ttl(ttl);
        self
    }

    /// Per-request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Cap the number of cached responses (default: bounded only by TTL).
    pub fn max_cache_entries(mut self, n: u64) -> Self {
        self.config = self.config.max_cache_entries(n);
        self
    }

    /// Replace the HTTP transport. The configured timeout is then the
    /// transport's responsibility.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CatalogClient> {
        if self.config.api_key.trim().is_empty() {
            return Err(CatalogError::Configuration("no API key configured".into()));
        }
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.timeout)?),
        };

        let mut cache_config = CacheConfig::new().ttl(self.config.default_ttl);
        if let Some(max) = self.config.max_cache_entries {
            cache_config = cache_config.max_entries(max);
        }
        let cache = ResponseCache::new(&cache_config);

        Ok(CatalogClient::new(self.config, transport, cache))
    }
}

impl Default for MarqueeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Marquee::builder().build().unwrap_err();
        assert_eq!(
            err,
            CatalogError::Configuration("no API key configured".into())
        );
    }

    #[test]
    fn builder_applies_settings() {
        let client = Marquee::builder()
            .api_key("key")
            .base_url("http://127.0.0.1:1/3/")
            .language("ja-JP")
            .ttl(Duration::from_secs(42))
            .build()
            .unwrap();

        let config = client.config();
        assert_eq!(config.base_url, "http://127.0.0.1:1/3");
        assert_eq!(config.language, "ja-JP");
        assert_eq!(config.default_ttl, Duration::from_secs(42));
    }

    #[test]
    fn image_url_uses_configured_host() {
        let client = Marquee::builder()
            .api_key("key")
            .image_base_url("https://cdn.example.com/")
            .build()
            .unwrap();
        assert_eq!(
            client.image_url(Some("/p.jpg"), Some("w185")).as_deref(),
            Some("https://cdn.example.com/t/p/w185/p.jpg")
        );
    }

    #[test]
    fn zero_entry_limit_is_rejected() {
        let err = Marquee::builder()
            .api_key("key")
            .max_cache_entries(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }
}
