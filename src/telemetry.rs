//! Telemetry metric name constants.
//!
//! Centralised metric names for marquee operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `marquee_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: catalog query (e.g. "trending", "movie_details")
//! - `status`: outcome: "ok" or "error"

/// Network calls issued to the provider (cache hits and coalesced joins
/// are not counted).
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "marquee_requests_total";

/// Network call duration in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "marquee_request_duration_seconds";

/// Total cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "marquee_cache_hits_total";

/// Total cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "marquee_cache_misses_total";

/// Callers that joined an already pending call instead of issuing their own.
///
/// Labels: `operation`.
pub const COALESCED_TOTAL: &str = "marquee_coalesced_total";
