//! HTTP transport seam.
//!
//! The client issues exactly one GET per settled network call through a
//! [`Transport`]. [`ReqwestTransport`] is the production implementation;
//! tests substitute their own to count calls or inject failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{CatalogError, Result};

/// Default timeout for a single catalog request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw outcome of a transport call: the status code and the body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single HTTP GET.
///
/// Implementations return `Ok` whenever a response was obtained, whatever its
/// status; status interpretation belongs to
/// [`normalize_response`](crate::error::normalize_response). Failures to
/// obtain a response at all must be reported as
/// [`CatalogError::Transport`] carrying the underlying message.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<RawResponse>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse> {
        let response = self
            .http
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
