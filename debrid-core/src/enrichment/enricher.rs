//! Enrichment entry points used before submitting a job

use super::bencode;
use super::{EnrichmentError, clear_trackers, merge_magnet_trackers, merge_torrent_trackers};
use crate::trackers::TrackerSource;

/// Adds trackers from a [`TrackerSource`] to magnet links and torrent files.
///
/// Inputs are never modified; each call returns a new value.
#[derive(Debug, Clone)]
pub struct TrackerEnricher<S> {
    source: S,
}

impl<S: TrackerSource> TrackerEnricher<S> {
    /// Creates an enricher backed by `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the magnet link with the source's trackers merged in.
    ///
    /// When the source has no trackers the magnet link is returned as is.
    ///
    /// # Errors
    ///
    /// - `EnrichmentError::Trackers` - Tracker list could not be fetched
    pub async fn enrich_magnet_link(&self, magnet: &str) -> Result<String, EnrichmentError> {
        let trackers = self.source.trackers().await?;

        if trackers.is_empty() {
            tracing::warn!("No new trackers were retrieved, magnet link left unchanged");
            return Ok(magnet.to_string());
        }

        let merged = merge_magnet_trackers(magnet, &trackers);
        tracing::info!(
            "Added {} new trackers to magnet link, total trackers: {}",
            merged.added,
            merged.total
        );
        Ok(merged.output)
    }

    /// Returns torrent file bytes with the source's trackers merged in.
    ///
    /// When the source has no trackers, `announce` is removed and
    /// `announce-list` is emptied.
    ///
    /// # Errors
    ///
    /// - `EnrichmentError::EmptyTorrent` - `torrent` is empty; the source is not called
    /// - `EnrichmentError::InvalidTorrent` - `torrent` is not a bencoded dictionary
    /// - `EnrichmentError::Trackers` - Tracker list could not be fetched
    pub async fn enrich_torrent_bytes(&self, torrent: &[u8]) -> Result<Vec<u8>, EnrichmentError> {
        if torrent.is_empty() {
            return Err(EnrichmentError::EmptyTorrent);
        }

        let dict = bencode::decode(torrent).map_err(|source| {
            tracing::error!("Failed to decode torrent bytes: {}", source);
            EnrichmentError::InvalidTorrent { source }
        })?;

        let trackers = self.source.trackers().await?;

        if trackers.is_empty() {
            tracing::warn!("No new trackers were retrieved, clearing torrent trackers");
            return Ok(bencode::encode(&clear_trackers(dict)));
        }

        let merged = merge_torrent_trackers(dict, &trackers);
        tracing::info!(
            "Added {} new trackers to torrent, total trackers: {}",
            merged.added,
            merged.total
        );
        Ok(bencode::encode(&merged.output))
    }
}
