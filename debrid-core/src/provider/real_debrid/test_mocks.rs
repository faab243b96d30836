//! Mock implementations for testing the Real-Debrid adapter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use parking_lot::Mutex;

use super::api::{
    AccountInfo, AddedTorrent, ApiConnector, RealDebridApi, TorrentInfo, TorrentInfoFile,
    UnrestrictedLink,
};
use crate::config::ProviderConfig;
use crate::provider::ProviderError;

/// Recorded calls and canned responses.
#[derive(Debug, Default)]
pub struct MockState {
    pub torrents: Vec<TorrentInfo>,
    pub account: Option<AccountInfo>,
    pub added_id: Option<String>,
    pub download: Option<String>,
    /// Status returned by every `torrent_info` call when set
    pub info_failure: Option<u16>,
    pub server_offset_seconds: i32,
    pub server_time_calls: usize,
    pub list_offsets: Vec<usize>,
    pub info_calls: usize,
    pub selected: Vec<(String, Vec<String>)>,
    pub deleted: Vec<String>,
}

/// In-memory Real-Debrid API.
#[derive(Debug, Default)]
pub struct MockRealDebridApi {
    pub state: Mutex<MockState>,
}

impl MockRealDebridApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a torrent the mock will list and describe.
    pub fn add_torrent_info(&self, torrent: TorrentInfo) {
        self.state.lock().torrents.push(torrent);
    }
}

/// Builds a torrent with sensible defaults.
pub fn torrent_info(id: &str, status: &str) -> TorrentInfo {
    TorrentInfo {
        id: id.to_string(),
        filename: Some(format!("{id}.mkv")),
        original_filename: None,
        hash: format!("hash-{id}"),
        bytes: 1024,
        original_bytes: 2048,
        host: Some("real-debrid.com".to_string()),
        split: 2000,
        progress: 100.0,
        status: status.to_string(),
        added: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        files: Some(vec![
            TorrentInfoFile {
                id: 1,
                path: "/sample.mkv".to_string(),
                bytes: 5 * 1024 * 1024,
                selected: 0,
            },
            TorrentInfoFile {
                id: 2,
                path: "/movie.mkv".to_string(),
                bytes: 700 * 1024 * 1024,
                selected: 1,
            },
        ]),
        links: Some(vec!["https://real-debrid.com/d/ABC".to_string()]),
        ended: Some(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()),
        speed: None,
        seeders: None,
    }
}

#[async_trait]
impl RealDebridApi for MockRealDebridApi {
    async fn torrents(&self, offset: usize, limit: usize) -> Result<Vec<TorrentInfo>, ProviderError> {
        let mut state = self.state.lock();
        state.list_offsets.push(offset);
        Ok(state
            .torrents
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn torrent_info(&self, id: &str) -> Result<TorrentInfo, ProviderError> {
        let mut state = self.state.lock();
        state.info_calls += 1;

        match state.info_failure {
            Some(404) => Err(ProviderError::NotFound {
                resource: format!("torrents/info/{id}"),
            }),
            Some(status) => Err(ProviderError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            None => state
                .torrents
                .iter()
                .find(|torrent| torrent.id == id)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound {
                    resource: format!("torrents/info/{id}"),
                }),
        }
    }

    async fn user(&self) -> Result<AccountInfo, ProviderError> {
        self.state
            .lock()
            .account
            .clone()
            .ok_or_else(|| ProviderError::Api {
                status: 401,
                message: "bad_token".to_string(),
            })
    }

    async fn add_magnet(&self, _magnet: &str) -> Result<AddedTorrent, ProviderError> {
        Ok(AddedTorrent {
            id: self.state.lock().added_id.clone(),
            uri: None,
        })
    }

    async fn add_torrent(&self, _torrent: &[u8]) -> Result<AddedTorrent, ProviderError> {
        Ok(AddedTorrent {
            id: self.state.lock().added_id.clone(),
            uri: None,
        })
    }

    async fn select_files(&self, id: &str, file_ids: &[String]) -> Result<(), ProviderError> {
        self.state
            .lock()
            .selected
            .push((id.to_string(), file_ids.to_vec()));
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.state.lock().deleted.push(id.to_string());
        Ok(())
    }

    async fn unrestrict_link(&self, link: &str) -> Result<UnrestrictedLink, ProviderError> {
        Ok(UnrestrictedLink {
            filename: Some(link.to_string()),
            download: self.state.lock().download.clone(),
        })
    }

    async fn server_time(&self) -> Result<DateTime<FixedOffset>, ProviderError> {
        let mut state = self.state.lock();
        state.server_time_calls += 1;

        let offset = FixedOffset::east_opt(state.server_offset_seconds).ok_or_else(|| {
            ProviderError::InvalidResponse {
                reason: "offset out of range".to_string(),
            }
        })?;
        Ok(Utc::now().with_timezone(&offset))
    }
}

/// Connector handing out one shared mock.
#[derive(Debug)]
pub struct MockConnector {
    pub api: Arc<MockRealDebridApi>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(api: Arc<MockRealDebridApi>) -> Self {
        Self {
            api,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ApiConnector for MockConnector {
    fn connect(
        &self,
        _api_key: &str,
        _config: &ProviderConfig,
    ) -> Result<Arc<dyn RealDebridApi>, ProviderError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.api.clone())
    }
}
