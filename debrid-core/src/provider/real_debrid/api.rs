//! Native Real-Debrid API surface

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::provider::ProviderError;

/// Torrent as returned by `/torrents` and `/torrents/info/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TorrentInfo {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    pub hash: String,
    #[serde(default)]
    pub bytes: i64,
    #[serde(default)]
    pub original_bytes: i64,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub split: i64,
    #[serde(default)]
    pub progress: f64,
    pub status: String,
    pub added: DateTime<Utc>,
    #[serde(default)]
    pub files: Option<Vec<TorrentInfoFile>>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
    #[serde(default)]
    pub ended: Option<DateTime<Utc>>,
    #[serde(default)]
    pub speed: Option<i64>,
    #[serde(default)]
    pub seeders: Option<i64>,
}

/// File entry inside [`TorrentInfo`]; `selected` is 0 or 1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TorrentInfoFile {
    pub id: i64,
    pub path: String,
    pub bytes: i64,
    pub selected: i64,
}

/// Account returned by `/user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfo {
    pub username: String,
    /// Remaining premium seconds
    #[serde(default)]
    pub premium: i64,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// Response of `/torrents/addMagnet` and `/torrents/addTorrent`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddedTorrent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Response of `/unrestrict/link`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnrestrictedLink {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub download: Option<String>,
}

/// Error body the API returns with non-success statuses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// `error_code` for `unknown_ressource`.
pub const UNKNOWN_RESOURCE_CODE: i64 = 7;

/// Authenticated Real-Debrid API operations.
#[async_trait]
pub trait RealDebridApi: Send + Sync {
    async fn torrents(&self, offset: usize, limit: usize) -> Result<Vec<TorrentInfo>, ProviderError>;

    async fn torrent_info(&self, id: &str) -> Result<TorrentInfo, ProviderError>;

    async fn user(&self) -> Result<AccountInfo, ProviderError>;

    async fn add_magnet(&self, magnet: &str) -> Result<AddedTorrent, ProviderError>;

    async fn add_torrent(&self, torrent: &[u8]) -> Result<AddedTorrent, ProviderError>;

    async fn select_files(&self, id: &str, file_ids: &[String]) -> Result<(), ProviderError>;

    async fn delete(&self, id: &str) -> Result<(), ProviderError>;

    async fn unrestrict_link(&self, link: &str) -> Result<UnrestrictedLink, ProviderError>;

    /// Server wall clock, including its UTC offset.
    async fn server_time(&self) -> Result<DateTime<FixedOffset>, ProviderError>;
}

/// Produces an API handle for the current credentials and timeout.
pub trait ApiConnector: Send + Sync {
    /// # Errors
    ///
    /// - `ProviderError::Http` - Client could not be built
    fn connect(
        &self,
        api_key: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn RealDebridApi>, ProviderError>;
}
