//! Provider-neutral job model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NormalizedStatus;

/// One file inside a provider job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    pub id: u64,
    pub path: String,
    pub size_bytes: u64,
    pub selected: bool,
}

/// Provider view of a job, mapped from the native API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub provider_id: String,
    /// Name after provider-side processing
    pub display_name: Option<String>,
    /// Name as submitted
    pub original_display_name: Option<String>,
    pub content_hash: String,
    pub total_bytes: u64,
    pub original_total_bytes: u64,
    pub host: Option<String>,
    pub split_size: u64,
    pub progress_percent: f64,
    pub raw_status: String,
    pub normalized_status: NormalizedStatus,
    pub files: Vec<JobFile>,
    pub download_links: Option<Vec<String>>,
    pub added_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub speed: Option<u64>,
    pub seeder_count: Option<u64>,
}

/// How files are chosen when the provider asks for a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadAction {
    /// Every file, subject to size and pattern filters
    #[default]
    All,
    /// Only files listed in `manual_files`
    Manual,
}

/// Provider-derived fields stored on a job record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteState {
    pub name: Option<String>,
    pub size: Option<u64>,
    pub host: Option<String>,
    pub split: Option<u64>,
    pub progress: Option<f64>,
    pub added: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,
    pub speed: Option<u64>,
    pub seeders: Option<u64>,
    pub status_raw: Option<String>,
    pub status: Option<NormalizedStatus>,
    /// Serialized `Vec<JobFile>`
    pub files_json: Option<String>,
}

/// A caller's job record, as far as the provider adapter is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentJob {
    pub id: Uuid,
    pub hash: String,
    pub provider_id: Option<String>,
    pub download_action: DownloadAction,
    pub download_min_size_mb: u64,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub manual_files: Vec<String>,
    pub remote: RemoteState,
}

impl TorrentJob {
    /// Creates a job for `hash` that has not been submitted yet.
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            hash: hash.into(),
            provider_id: None,
            download_action: DownloadAction::All,
            download_min_size_mb: 0,
            include_pattern: None,
            exclude_pattern: None,
            manual_files: Vec::new(),
            remote: RemoteState::default(),
        }
    }

    /// Files stored from the last provider update.
    ///
    /// Missing or unreadable JSON yields an empty list.
    pub fn files(&self) -> Vec<JobFile> {
        self.remote
            .files_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }

    /// Short identity used in log lines.
    pub fn log_label(&self) -> String {
        format!(
            "(id: {}, hash: {}, provider id: {}, name: {})",
            self.id,
            self.hash,
            self.provider_id.as_deref().unwrap_or("-"),
            self.remote.name.as_deref().unwrap_or("-")
        )
    }
}

/// Provider account summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub username: String,
    /// Present only for premium accounts
    pub expiration: Option<DateTime<Utc>>,
}

/// File offered for instant download before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFile {
    pub filename: String,
    pub size_bytes: u64,
}
