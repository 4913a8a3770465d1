//! Client configuration.
//!
//! [`ClientConfig`] is assembled once (directly, from the environment, or via
//! [`MarqueeBuilder`](crate::MarqueeBuilder)) and never mutated afterwards.

#[cfg(feature = "cli")]
pub mod file;

use std::time::Duration;

use crate::transport::DEFAULT_TIMEOUT;
use crate::{CatalogError, Result};

/// Default TMDB v3 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default host serving TMDB image assets.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org";

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Environment variable names consulted by [`ClientConfig::from_env`].
pub const ENV_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_BASE_URL: &str = "TMDB_BASE_URL";
pub const ENV_IMAGE_BASE_URL: &str = "TMDB_IMAGE_BASE_URL";
pub const ENV_LANGUAGE: &str = "TMDB_LANGUAGE";

/// Immutable settings for a [`CatalogClient`](crate::CatalogClient).
///
/// ```rust
/// # use marquee::ClientConfig;
/// # use std::time::Duration;
/// let config = ClientConfig::new("my-key")
///     .language("de-DE")
///     .default_ttl(Duration::from_secs(60));
/// assert_eq!(config.base_url, "https://api.themoviedb.org/3");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TMDB v3 API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Image asset host, without a trailing slash.
    pub image_base_url: String,
    /// TTL applied to every successful response.
    pub default_ttl: Duration,
    /// `language` query parameter sent with every request.
    pub language: String,
    /// Per-request timeout enforced by the transport.
    pub timeout: Duration,
    /// Optional cap on cached responses. `None` keeps every response for
    /// its full TTL.
    pub max_cache_entries: Option<u64>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            default_ttl: DEFAULT_TTL,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_cache_entries: None,
        }
    }

    /// Read configuration from `TMDB_*` environment variables.
    ///
    /// `TMDB_API_KEY` is required; the other variables override defaults
    /// when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CatalogError::Configuration(format!("{ENV_API_KEY} is not set")))?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.base_url(url);
        }
        if let Some(url) = lookup(ENV_IMAGE_BASE_URL) {
            config = config.image_base_url(url);
        }
        if let Some(language) = lookup(ENV_LANGUAGE) {
            config = config.language(language);
        }
        Ok(config)
    }

    /// Set the API root. A trailing slash is stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the image asset host. A trailing slash is stripped.
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap the number of cached responses. Must be non-zero.
    pub fn max_cache_entries(mut self, n: u64) -> Self {
        self.max_cache_entries = Some(n);
        self
    }

    /// Reject configurations the client cannot work with.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(CatalogError::Configuration("API key is empty".into()));
        }
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            CatalogError::Configuration(format!("invalid base URL {:?}: {e}", self.base_url))
        })?;
        if self.default_ttl.is_zero() {
            return Err(CatalogError::Configuration("cache TTL must be non-zero".into()));
        }
        if self.max_cache_entries == Some(0) {
            return Err(CatalogError::Configuration(
                "cache entry limit must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Defaults with an empty API key; building a client from it fails until a
/// key is set.
impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}
