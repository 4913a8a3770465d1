//! Request coalescing.
//!
//! [`InFlightRegistry`] maps a [`Fingerprint`] to the [`PendingCall`] that is
//! currently fetching it. The first caller to miss the cache becomes the
//! [`Role::Leader`] and starts the call; everyone arriving before it settles
//! becomes a [`Role::Follower`] and awaits the same shared outcome. A caller
//! whose cache miss raced with a call settling finds the fresh value through
//! the cache re-check and gets [`Role::Cached`].
//!
//! The started future is spawned onto the tokio runtime, so it always runs
//! to completion even if every caller stops polling. When it settles, the
//! registry entry is removed whatever the outcome; the next caller starts
//! fresh. The registry is not a cache: it holds no value after settlement.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use serde_json::Value;
use tracing::debug;

use crate::request::Fingerprint;
use crate::{CatalogError, Result};

/// Shared handle to the outcome of one network call.
///
/// Cloning is cheap; every clone resolves to the same result.
pub type PendingCall = Shared<BoxFuture<'static, Result<Value>>>;

/// How a caller relates to the call it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Started the network call.
    Leader,
    /// Joined a call another caller had already started.
    Follower,
    /// No call was needed: a call settled after the caller's cache miss and
    /// its value was already cached.
    Cached,
}

/// Registry of pending calls, at most one per fingerprint.
#[derive(Default)]
pub struct InFlightRegistry {
    pending: Mutex<HashMap<Fingerprint, PendingCall>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the pending call for `fingerprint`, or start one with `start`.
    ///
    /// With no call pending, `cached` is consulted under the registry lock
    /// before anything starts. The settling task writes the cache before it
    /// removes its entry, so a value written by a call that settled after
    /// the caller's own cache miss is found here.
    ///
    /// `start` is invoked only when no call is pending and `cached` yields
    /// nothing, while the registry lock is held, so two racing callers can
    /// never both become leader.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context (the call is spawned).
    pub fn join<C, F, Fut>(
        self: &Arc<Self>,
        fingerprint: &Fingerprint,
        cached: C,
        start: F,
    ) -> (PendingCall, Role)
    where
        C: FnOnce() -> Option<Value>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let mut pending = self.lock();
        if let Some(call) = pending.get(fingerprint) {
            debug!(%fingerprint, "joining in-flight call");
            return (call.clone(), Role::Follower);
        }

        if let Some(value) = cached() {
            debug!(%fingerprint, "call settled before join, serving cached value");
            return (future::ready(Ok(value)).boxed().shared(), Role::Cached);
        }

        let registry = Arc::clone(self);
        let key = fingerprint.clone();
        let fut = start();
        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            registry.remove(&key);
            outcome
        });

        let call: PendingCall = async move {
            handle.await.unwrap_or_else(|e| {
                Err(CatalogError::Transport(format!("network task failed: {e}")))
            })
        }
        .boxed()
        .shared();

        pending.insert(fingerprint.clone(), call.clone());
        (call, Role::Leader)
    }

    /// Number of pending calls.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, fingerprint: &Fingerprint) {
        if self.lock().remove(fingerprint).is_some() {
            debug!(%fingerprint, "in-flight call settled");
        }
    }

    // Critical sections never panic, so a poisoned lock still holds a
    // consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, PendingCall>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
