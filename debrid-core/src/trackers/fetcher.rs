//! Configured tracker list fetcher

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{
    HttpTrackerListTransport, TrackerListCache, TrackerListError, TrackerListTransport,
    TrackerSource, TrackerTransportError, TrackerUrl, parse_tracker_list,
};
use crate::config::ConfigSource;

/// Upper bound for one tracker list download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches the configured tracker list through a shared cache.
///
/// Configuration is re-read on every call, so changes to the list URL or
/// the cache TTL take effect immediately.
#[derive(Clone)]
pub struct TrackerListFetcher {
    config: Arc<dyn ConfigSource>,
    transport: Arc<dyn TrackerListTransport>,
    cache: Arc<TrackerListCache>,
}

impl TrackerListFetcher {
    /// Creates a fetcher from its collaborators.
    pub fn new(
        config: Arc<dyn ConfigSource>,
        transport: Arc<dyn TrackerListTransport>,
        cache: Arc<TrackerListCache>,
    ) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    /// Creates a fetcher with the reqwest transport and a private cache.
    ///
    /// # Errors
    ///
    /// - `TrackerTransportError::Client` - HTTP client could not be built
    pub fn with_http(config: Arc<dyn ConfigSource>) -> Result<Self, TrackerTransportError> {
        Ok(Self::new(
            config,
            Arc::new(HttpTrackerListTransport::new()?),
            Arc::new(TrackerListCache::new()),
        ))
    }

    async fn fetch(&self, url: &Url) -> Result<Arc<[TrackerUrl]>, TrackerListError> {
        let body = match tokio::time::timeout(FETCH_TIMEOUT, self.transport.fetch(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) if e.is_timeout() => {
                tracing::error!("Tracker list fetch from {} timed out", url);
                return Err(TrackerListError::Canceled);
            }
            Ok(Err(e)) => {
                tracing::error!("Unable to fetch tracker list from {}: {}", url, e);
                return Err(TrackerListError::Unavailable { source: e });
            }
            Err(_) => {
                tracing::error!(
                    "Tracker list fetch from {} exceeded {:?}",
                    url,
                    FETCH_TIMEOUT
                );
                return Err(TrackerListError::Canceled);
            }
        };

        let trackers = parse_tracker_list(&body);
        tracing::debug!("Fetched {} trackers from {}", trackers.len(), url);
        Ok(trackers.into())
    }
}

impl std::fmt::Debug for TrackerListFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerListFetcher")
            .field("transport", &self.transport)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Resolves the configured list location, if usable.
fn source_url(configured: Option<&str>) -> Option<Url> {
    let Some(raw) = configured.map(str::trim).filter(|raw| !raw.is_empty()) else {
        tracing::debug!("No tracker list URL configured, skipping enrichment");
        return None;
    };

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        _ => {
            tracing::warn!("Tracker list URL is not an absolute http(s) URL: {}", raw);
            None
        }
    }
}

#[async_trait]
impl TrackerSource for TrackerListFetcher {
    async fn trackers(&self) -> Result<Arc<[TrackerUrl]>, TrackerListError> {
        let config = self.config.current().trackers;

        let Some(url) = source_url(config.list_url.as_deref()) else {
            return Ok(Arc::from(Vec::new()));
        };

        let ttl_minutes = config.cache_expiration_minutes;
        if !self.cache.observe_ttl(ttl_minutes) {
            return self.fetch(&url).await;
        }

        if let Some(trackers) = self.cache.lookup() {
            tracing::debug!("Tracker list cache hit ({} trackers)", trackers.len());
            return Ok(trackers);
        }

        let _guard = self.cache.refresh_guard().await;

        // Another caller may have refreshed while we waited
        if let Some(trackers) = self.cache.lookup() {
            tracing::debug!("Tracker list refreshed by concurrent caller");
            return Ok(trackers);
        }

        let trackers = self.fetch(&url).await?;
        self.cache.store(Arc::clone(&trackers), ttl_minutes);
        Ok(trackers)
    }
}
