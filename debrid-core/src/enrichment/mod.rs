//! Tracker enrichment for magnet links and torrent files.
//!
//! Adds the trackers supplied by a [`TrackerSource`](crate::trackers::TrackerSource)
//! before a job is submitted to the provider. Magnet query strings are edited
//! through an ordered multimap and torrent files through the order-preserving
//! bencode codec, so everything except the tracker fields survives unchanged.

pub mod bencode;
pub mod enricher;
pub mod magnet;
pub mod torrent;

pub use bencode::{BencodeDict, BencodeError, BencodeValue};
pub use enricher::TrackerEnricher;
pub use magnet::{QueryParams, merge_magnet_trackers};
pub use torrent::{clear_trackers, existing_trackers, merge_torrent_trackers};

use crate::trackers::TrackerListError;

/// Errors from enrichment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Torrent bytes cannot be empty")]
    EmptyTorrent,

    #[error("Invalid torrent file format: {source}")]
    InvalidTorrent {
        #[source]
        source: BencodeError,
    },

    #[error(transparent)]
    Trackers(#[from] TrackerListError),
}

/// Result of a merge along with how many trackers it added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged<T> {
    pub output: T,
    /// Trackers that were not present before
    pub added: usize,
    /// Trackers present after the merge
    pub total: usize,
}
