//! Tracker list sourcing for enrichment.
//!
//! A plain-text list of announce URLs is fetched from a configured location,
//! validated line by line and cached with a single-flight guarantee: however
//! many callers miss the cache at once, one network fetch serves them all.

pub mod cache;
pub mod fetcher;
pub mod list;
pub mod transport;
pub mod tracker_url;

use std::sync::Arc;

use async_trait::async_trait;

pub use cache::TrackerListCache;
pub use fetcher::{FETCH_TIMEOUT, TrackerListFetcher};
pub use list::parse_tracker_list;
pub use transport::{HttpTrackerListTransport, TrackerListTransport, TrackerTransportError};
pub use tracker_url::TrackerUrl;

/// Errors surfaced while obtaining the tracker list.
#[derive(Debug, thiserror::Error)]
pub enum TrackerListError {
    #[error("Tracker list fetch was canceled")]
    Canceled,

    #[error("Unable to fetch tracker list: {source}")]
    Unavailable {
        #[source]
        source: TrackerTransportError,
    },
}

/// Supplier of additional trackers for enrichment.
#[async_trait]
pub trait TrackerSource: Send + Sync {
    /// Returns the current tracker list, possibly empty.
    ///
    /// An empty list means enrichment is not configured; it is not an error.
    ///
    /// # Errors
    ///
    /// - `TrackerListError::Canceled` - Fetch timed out or was canceled
    /// - `TrackerListError::Unavailable` - Source could not be fetched
    async fn trackers(&self) -> Result<Arc<[TrackerUrl]>, TrackerListError>;
}

#[async_trait]
impl<T: TrackerSource + ?Sized> TrackerSource for Arc<T> {
    async fn trackers(&self) -> Result<Arc<[TrackerUrl]>, TrackerListError> {
        (**self).trackers().await
    }
}
