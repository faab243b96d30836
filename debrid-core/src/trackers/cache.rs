//! Tracker list cache with single-flight refresh

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use super::TrackerUrl;

/// Cached tracker list shared by every fetcher built on it.
///
/// Reads go through a `RwLock` and never wait on the refresh lock. Only
/// callers that miss contend on [`TrackerListCache::refresh_guard`], and they
/// must re-check with [`TrackerListCache::lookup`] once they hold it.
#[derive(Debug, Default)]
pub struct TrackerListCache {
    state: RwLock<CacheState>,
    refresh: Mutex<()>,
}

#[derive(Debug, Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    observed_ttl_minutes: Option<i64>,
}

#[derive(Debug)]
struct CacheEntry {
    trackers: Arc<[TrackerUrl]>,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl TrackerListCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the TTL in effect for this call.
    ///
    /// Returns `false` when caching is disabled (`ttl_minutes <= 0`); the
    /// entry and the remembered TTL are then dropped. A TTL different from
    /// the one seen last time invalidates the entry.
    pub fn observe_ttl(&self, ttl_minutes: i64) -> bool {
        if ttl_minutes <= 0 {
            let mut state = self.state.write();
            if state.entry.is_some() || state.observed_ttl_minutes.is_some() {
                tracing::debug!("Tracker list caching disabled, clearing cached entry");
            }
            state.entry = None;
            state.observed_ttl_minutes = None;
            return false;
        }

        if self.state.read().observed_ttl_minutes == Some(ttl_minutes) {
            return true;
        }

        let mut state = self.state.write();
        if state.observed_ttl_minutes != Some(ttl_minutes) {
            if let Some(previous) = state.observed_ttl_minutes {
                tracing::debug!(
                    "Tracker cache TTL changed from {} to {} minutes, invalidating",
                    previous,
                    ttl_minutes
                );
            }
            state.entry = None;
            state.observed_ttl_minutes = Some(ttl_minutes);
        }
        true
    }

    /// Returns the cached list if it is unexpired and non-empty.
    pub fn lookup(&self) -> Option<Arc<[TrackerUrl]>> {
        let state = self.state.read();
        state
            .entry
            .as_ref()
            .filter(|entry| {
                entry.expires_at.is_none_or(|at| at > Instant::now()) && !entry.trackers.is_empty()
            })
            .map(|entry| Arc::clone(&entry.trackers))
    }

    /// Stores a freshly fetched list for `ttl_minutes`.
    ///
    /// Ignored when the TTL is no longer the observed one, which happens if
    /// configuration changed while the fetch was in flight.
    pub fn store(&self, trackers: Arc<[TrackerUrl]>, ttl_minutes: i64) {
        let mut state = self.state.write();
        if ttl_minutes <= 0 || state.observed_ttl_minutes != Some(ttl_minutes) {
            return;
        }

        let lifetime = Duration::from_secs(ttl_minutes.unsigned_abs().saturating_mul(60));
        state.entry = Some(CacheEntry {
            trackers,
            expires_at: Instant::now().checked_add(lifetime),
        });
    }

    /// Drops the cached entry.
    pub fn clear(&self) {
        self.state.write().entry = None;
    }

    /// Waits for the single-flight refresh lock.
    ///
    /// The guard releases the lock on drop, including when the owning future
    /// is canceled.
    pub async fn refresh_guard(&self) -> MutexGuard<'_, ()> {
        self.refresh.lock().await
    }
}
