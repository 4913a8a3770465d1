//! CatalogClient - the public façade over the TMDB catalog

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{InFlightRegistry, ResponseCache, Role};
use crate::config::ClientConfig;
use crate::error::normalize_response;
use crate::request::{self, Endpoint, PreparedRequest, TimeWindow};
use crate::telemetry;
use crate::transport::Transport;
use crate::{CatalogError, Result};

/// Cached, coalescing client for the TMDB catalog.
///
/// Every query runs the same pipeline: validate and fingerprint the request,
/// answer from the cache if a fresh entry exists, otherwise join (or start)
/// the single in-flight network call for that fingerprint. Successful
/// responses are cached for [`ClientConfig::default_ttl`]; failures are
/// never cached and leave no in-flight state behind, so the next call
/// retries immediately.
///
/// Cloning is cheap and clones share the same cache and in-flight registry.
#[derive(Clone)]
pub struct CatalogClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    inflight: Arc<InFlightRegistry>,
}

impl CatalogClient {
    pub(crate) fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            cache: Arc::new(cache),
            inflight: Arc::new(InFlightRegistry::new()),
        }
    }

    /// Trending movies, series and people for `window`.
    pub async fn trending(&self, window: TimeWindow, page: u32) -> Result<Value> {
        self.fetch(Endpoint::Trending { window, page }).await
    }

    /// Popular movies.
    pub async fn popular_movies(&self, page: u32) -> Result<Value> {
        self.fetch(Endpoint::PopularMovies { page }).await
    }

    /// Full movie details with credits and videos merged into one response.
    pub async fn movie_details(&self, id: u64) -> Result<Value> {
        self.fetch(Endpoint::MovieDetails { id }).await
    }

    /// Full series details with credits and videos merged into one response.
    pub async fn series_details(&self, id: u64) -> Result<Value> {
        self.fetch(Endpoint::SeriesDetails { id }).await
    }

    /// Search movies, series and people at once.
    pub async fn search_multi(&self, query: &str, page: u32) -> Result<Value> {
        self.fetch(Endpoint::SearchMulti {
            query: query.to_string(),
            page,
        })
        .await
    }

    /// Genre vocabulary for movies.
    pub async fn movie_genres(&self) -> Result<Value> {
        self.fetch(Endpoint::MovieGenres).await
    }

    /// Genre vocabulary for series.
    pub async fn tv_genres(&self) -> Result<Value> {
        self.fetch(Endpoint::TvGenres).await
    }

    /// Run any endpoint through the cache / coalescing pipeline.
    pub async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        let request = PreparedRequest::new(&self.config, &endpoint)?;
        let operation = request.operation;

        if let Some(value) = self.cache.get(&request.fingerprint) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
            debug!(fingerprint = %request.fingerprint, operation, "cache hit");
            return Ok(value);
        }

        let fingerprint = request.fingerprint.clone();
        let (call, role) = self.inflight.join(
            &fingerprint,
            || self.cache.get(&fingerprint),
            || self.issue(request),
        );
        match role {
            Role::Cached => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation)
                    .increment(1);
            }
            Role::Leader => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation)
                    .increment(1);
            }
            Role::Follower => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation)
                    .increment(1);
                metrics::counter!(telemetry::COALESCED_TOTAL, "operation" => operation)
                    .increment(1);
            }
        }

        call.await
    }

    /// Like [`fetch`](Self::fetch), then decode the payload into `T`.
    ///
    /// The cached value stays the raw JSON; a shape mismatch surfaces as
    /// [`CatalogError::Decode`] and does not evict anything.
    pub async fn fetch_as<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let value = self.fetch(endpoint).await?;
        serde_json::from_value(value).map_err(CatalogError::from)
    }

    /// Fully qualified image URL for a TMDB image path.
    ///
    /// `size` defaults to `original`. Returns `None` when `path` is absent
    /// or empty.
    pub fn image_url(&self, path: Option<&str>, size: Option<&str>) -> Option<String> {
        request::image_url(&self.config.image_base_url, path, size)
    }

    /// Drop every cached response.
    ///
    /// Calls already in flight are left alone and still cache their result
    /// when they settle.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("response cache cleared");
    }

    /// Number of cached responses.
    pub fn cached_entries(&self) -> u64 {
        self.cache.len()
    }

    /// Number of network calls currently awaiting a response.
    pub fn pending_calls(&self) -> usize {
        self.inflight.len()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the network future for a leader. Writes the cache on success
    /// before the registry entry is released.
    fn issue(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<Value>> + Send + use<> {
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);

        async move {
            let PreparedRequest {
                operation,
                fingerprint,
                url,
            } = request;
            debug!(%fingerprint, operation, "issuing catalog request");

            let started = Instant::now();
            let outcome = transport.get(&url).await.and_then(normalize_response);
            metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "operation" => operation)
                .record(started.elapsed().as_secs_f64());

            match &outcome {
                Ok(value) => {
                    metrics::counter!(
                        telemetry::REQUESTS_TOTAL,
                        "operation" => operation,
                        "status" => "ok"
                    )
                    .increment(1);
                    cache.insert_default(fingerprint, value.clone());
                }
                Err(error) => {
                    metrics::counter!(
                        telemetry::REQUESTS_TOTAL,
                        "operation" => operation,
                        "status" => "error"
                    )
                    .increment(1);
                    warn!(%fingerprint, operation, %error, "catalog request failed");
                }
            }

            outcome
        }
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.config.base_url)
            .field("language", &self.config.language)
            .finish_non_exhaustive()
    }
}
