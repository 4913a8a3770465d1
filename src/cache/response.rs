//! Time-bounded response cache keyed by request fingerprint.
//!
//! [`ResponseCache`] memoizes successful catalog responses. Each entry
//! carries its own TTL; expiry is enforced on access, so an entry past its
//! deadline reads as a miss even before moka physically evicts it.
//!
//! By default the cache is bounded only by TTL: a value written within its
//! TTL is always read back. An entry cap is opt-in, and once it is reached
//! moka's admission policy may decline new writes.
//!
//! Only successful responses are ever inserted. The client writes here from
//! the task that settles a network call, never from a failed one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;
use serde_json::Value;

use crate::request::Fingerprint;

/// Configuration for the response cache.
///
/// ```rust
/// # use marquee::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Optional cap on cached entries. Default: unbounded.
    pub max_entries: Option<u64>,
    /// TTL applied by [`ResponseCache::insert_default`]. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            ttl: crate::config::DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = Some(n);
        self
    }

    /// Set the default time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: Arc<Value>,
    ttl: Duration,
}

/// Expires each entry `ttl` after its latest write.
struct PerEntryTtl;

impl Expiry<Fingerprint, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory fingerprint → JSON cache with per-entry expiry.
///
/// Thread-safe; moka synchronizes internally. Values are handed out as
/// owned clones, so callers cannot mutate cached state.
pub struct ResponseCache {
    entries: Cache<Fingerprint, CacheEntry>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().expire_after(PerEntryTtl);
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        Self {
            entries: builder.build(),
            default_ttl: config.ttl,
        }
    }

    /// Look up a fresh entry. Expired entries are treated as absent.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Value> {
        self.entries
            .get(fingerprint)
            .map(|entry| Value::clone(&entry.value))
    }

    /// Insert (or overwrite) an entry that expires `ttl` from now.
    pub fn insert(&self, fingerprint: Fingerprint, value: Value, ttl: Duration) {
        self.entries.insert(
            fingerprint,
            CacheEntry {
                value: Arc::new(value),
                ttl,
            },
        );
    }

    /// Insert using the configured default TTL.
    pub fn insert_default(&self, fingerprint: Fingerprint, value: Value) {
        self.insert(fingerprint, value, self.default_ttl);
    }

    /// Evict all entries. Idempotent.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of entries currently held, after flushing pending maintenance.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
