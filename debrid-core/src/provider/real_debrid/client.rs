//! Real-Debrid implementation of [`DebridProvider`]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use tokio::sync::OnceCell;

use super::api::{ApiConnector, RealDebridApi, TorrentInfo};
use super::http::HttpConnector;
use crate::config::ConfigSource;
use crate::provider::{
    AvailableFile, DELETED_STATUS, DebridProvider, JobFile, JobSnapshot, NormalizedStatus,
    ProviderError, ProviderUser, TorrentJob, apply_snapshot, needs_refresh, ready_links,
    select_job_files,
};

/// Page size used when listing torrents.
pub const TORRENT_PAGE_SIZE: usize = 5000;

/// Real-Debrid provider adapter.
///
/// Credentials and timeouts are read from configuration on every call. The
/// server clock offset is fetched on the first successful connection and kept
/// for the lifetime of the client; provider timestamps are shifted by it.
pub struct RealDebridClient {
    config: Arc<dyn ConfigSource>,
    connector: Arc<dyn ApiConnector>,
    clock_offset: OnceCell<FixedOffset>,
}

impl RealDebridClient {
    pub fn new(config: Arc<dyn ConfigSource>, connector: Arc<dyn ApiConnector>) -> Self {
        Self {
            config,
            connector,
            clock_offset: OnceCell::new(),
        }
    }

    /// Creates a client that talks to the configured REST endpoint.
    pub fn with_http(config: Arc<dyn ConfigSource>) -> Self {
        Self::new(config, Arc::new(HttpConnector::new()))
    }

    async fn api(&self) -> Result<Arc<dyn RealDebridApi>, ProviderError> {
        let provider = self.config.current().provider;
        let api_key = provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let api = self.connector.connect(api_key, &provider)?;

        self.clock_offset
            .get_or_try_init(|| async {
                let server_time = api.server_time().await.map_err(|e| {
                    tracing::error!("The connection to Real-Debrid has failed: {}", e);
                    e
                })?;
                tracing::debug!("Real-Debrid server offset is {}", server_time.offset());
                Ok::<_, ProviderError>(*server_time.offset())
            })
            .await?;

        Ok(api)
    }

    /// Converts a provider timestamp to true UTC.
    fn correct_time(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        match self.clock_offset.get() {
            Some(offset) => time - TimeDelta::seconds(i64::from(offset.local_minus_utc())),
            None => time,
        }
    }

    fn snapshot(&self, torrent: TorrentInfo) -> JobSnapshot {
        let files = torrent
            .files
            .unwrap_or_default()
            .into_iter()
            .map(|file| JobFile {
                id: non_negative(file.id),
                path: file.path,
                size_bytes: non_negative(file.bytes),
                selected: file.selected != 0,
            })
            .collect();

        JobSnapshot {
            normalized_status: NormalizedStatus::from_raw(&torrent.status),
            provider_id: torrent.id,
            display_name: torrent.filename,
            original_display_name: torrent.original_filename,
            content_hash: torrent.hash,
            total_bytes: non_negative(torrent.bytes),
            original_total_bytes: non_negative(torrent.original_bytes),
            host: torrent.host,
            split_size: non_negative(torrent.split),
            progress_percent: torrent.progress,
            raw_status: torrent.status,
            files,
            download_links: torrent.links,
            added_at: self.correct_time(torrent.added),
            ended_at: torrent.ended.map(|ended| self.correct_time(ended)),
            speed: torrent.speed.map(non_negative),
            seeder_count: torrent.seeders.map(non_negative),
        }
    }

    async fn info(&self, provider_id: &str) -> Result<JobSnapshot, ProviderError> {
        let torrent = self.api().await?.torrent_info(provider_id).await?;
        Ok(self.snapshot(torrent))
    }
}

impl std::fmt::Debug for RealDebridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealDebridClient")
            .field("clock_offset", &self.clock_offset.get())
            .finish_non_exhaustive()
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl DebridProvider for RealDebridClient {
    async fn torrents(&self) -> Result<Vec<JobSnapshot>, ProviderError> {
        let mut offset = 0;
        let mut results = Vec::new();

        loop {
            let page = self.api().await?.torrents(offset, TORRENT_PAGE_SIZE).await?;
            if page.is_empty() {
                break;
            }
            results.extend(page);
            offset += TORRENT_PAGE_SIZE;
        }

        tracing::debug!("Fetched {} torrents from Real-Debrid", results.len());
        Ok(results
            .into_iter()
            .map(|torrent| self.snapshot(torrent))
            .collect())
    }

    async fn user(&self) -> Result<ProviderUser, ProviderError> {
        let account = self.api().await?.user().await?;
        Ok(ProviderUser {
            username: account.username,
            expiration: if account.premium > 0 {
                account.expiration
            } else {
                None
            },
        })
    }

    async fn add_magnet(&self, magnet: &str) -> Result<String, ProviderError> {
        let added = self.api().await?.add_magnet(magnet).await?;
        added.id.ok_or_else(|| ProviderError::InvalidResponse {
            reason: "Unable to add magnet link, response has no id".to_string(),
        })
    }

    async fn add_file(&self, torrent: &[u8]) -> Result<String, ProviderError> {
        let added = self.api().await?.add_torrent(torrent).await?;
        added.id.ok_or_else(|| ProviderError::InvalidResponse {
            reason: "Unable to add torrent file, response has no id".to_string(),
        })
    }

    async fn available_files(&self, _hash: &str) -> Result<Vec<AvailableFile>, ProviderError> {
        Ok(Vec::new())
    }

    async fn select_files(&self, job: &TorrentJob) -> Result<(), ProviderError> {
        let provider_id = job
            .provider_id
            .as_deref()
            .ok_or_else(|| ProviderError::InvalidRequest {
                reason: format!("Job {} has no provider id", job.id),
            })?;

        let selected = select_job_files(job, &job.files())?;
        let file_ids: Vec<String> = selected.iter().map(|file| file.id.to_string()).collect();

        self.api()
            .await?
            .select_files(provider_id, &file_ids)
            .await
    }

    async fn delete(&self, provider_id: &str) -> Result<(), ProviderError> {
        self.api().await?.delete(provider_id).await
    }

    async fn unrestrict(&self, link: &str) -> Result<String, ProviderError> {
        let unrestricted = self.api().await?.unrestrict_link(link).await?;
        unrestricted
            .download
            .ok_or_else(|| ProviderError::InvalidResponse {
                reason: "Unrestrict returned an invalid download".to_string(),
            })
    }

    async fn update_data(
        &self,
        mut job: TorrentJob,
        snapshot: Option<JobSnapshot>,
    ) -> Result<TorrentJob, ProviderError> {
        let Some(provider_id) = job.provider_id.clone() else {
            return Ok(job);
        };

        let snapshot = match snapshot {
            Some(snapshot) if !needs_refresh(Some(&snapshot)) => snapshot,
            _ => match self.info(&provider_id).await {
                Ok(fresh) => fresh,
                Err(e) if e.is_not_found() => {
                    tracing::info!("Job {} no longer exists on Real-Debrid", job.log_label());
                    job.remote.status_raw = Some(DELETED_STATUS.to_string());
                    return Ok(job);
                }
                Err(e) => return Err(e),
            },
        };

        apply_snapshot(&mut job, &snapshot);
        Ok(job)
    }

    async fn download_links(&self, job: &TorrentJob) -> Result<Option<Vec<String>>, ProviderError> {
        let Some(provider_id) = job.provider_id.as_deref() else {
            return Ok(None);
        };

        let info = self.info(provider_id).await?;
        Ok(ready_links(job, info.download_links, Utc::now()))
    }
}
