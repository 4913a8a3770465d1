//! Caching subsystem.
//!
//! Two cooperating structures, both owned by a
//! [`CatalogClient`](crate::CatalogClient) and shared by its clones:
//!
//! - [`response::ResponseCache`]: fingerprint-keyed memoization of
//!   successful responses with per-entry TTL and lazy expiry.
//!
//! - [`inflight::InFlightRegistry`]: one shared future per fingerprint while
//!   a network call is pending, so concurrent identical requests coalesce
//!   into a single call. Holds nothing once the call settles.
//!
//! Neither survives the process; there is no persistence layer.

pub mod inflight;
pub mod response;

pub use inflight::{InFlightRegistry, PendingCall, Role};
pub use response::{CacheConfig, ResponseCache};
