//! Marquee error types

use tracing::warn;

use crate::transport::RawResponse;

/// Provider name embedded in upstream error messages.
pub const PROVIDER: &str = "TMDB";

/// Marquee error types
///
/// Every variant is `Clone` so a single settled network call can be fanned
/// out to all callers that were waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Caller supplied an out-of-domain argument. Raised before any network
    /// attempt.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The provider answered with a non-success status.
    #[error("{provider} API error: {status}")]
    Upstream { provider: &'static str, status: u16 },

    /// No response was obtained (DNS, connection reset, timeout). The
    /// message is the underlying failure text, unmodified.
    #[error("{0}")]
    Transport(String),

    /// A response arrived but its body could not be interpreted.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CatalogError {
    /// Shorthand for an upstream status error from TMDB.
    pub fn upstream(status: u16) -> Self {
        CatalogError::Upstream {
            provider: PROVIDER,
            status,
        }
    }

    /// Whether a caller-side retry has a reasonable chance of succeeding.
    ///
    /// The client itself never retries; this is for resilience layers built
    /// on top of it.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Transport(_) => true,
            CatalogError::Upstream { status, .. } => {
                *status == 429 || matches!(status, 500 | 502 | 503 | 504)
            }
            CatalogError::Validation(_)
            | CatalogError::Decode(_)
            | CatalogError::Configuration(_) => false,
        }
    }
}

/// The request URL is stripped first: it carries the API key as a query
/// parameter and must not reach error messages or logs.
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

/// Result type alias for Marquee operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Map a raw response to either its parsed JSON body or a normalized error.
///
/// Non-success statuses become [`CatalogError::Upstream`] regardless of body
/// content; success bodies that are not valid JSON become
/// [`CatalogError::Decode`].
pub fn normalize_response(response: RawResponse) -> Result<serde_json::Value> {
    if !response.is_success() {
        warn!(status = response.status, "{PROVIDER} returned error status");
        return Err(CatalogError::upstream(response.status));
    }

    serde_json::from_slice(&response.body).map_err(CatalogError::from)
}
