//! Debrid provider abstractions and implementations
//!
//! A provider runs the actual downloads remotely. The adapter maps its native
//! job representation into [`JobSnapshot`] and [`TorrentJob`] updates, applies
//! the file-selection policy and decides when download links are final.

pub mod error;
pub mod mapping;
pub mod readiness;
pub mod real_debrid;
pub mod selection;
pub mod status;
pub mod types;

use async_trait::async_trait;

pub use error::ProviderError;
pub use mapping::{apply_snapshot, needs_refresh};
pub use readiness::{SINGLE_LINK_GRACE, ready_links};
pub use selection::select_job_files;
pub use status::{DELETED_STATUS, NormalizedStatus, VIDEO_EXTENSIONS, strip_video_extension};
pub use types::{
    AvailableFile, DownloadAction, JobFile, JobSnapshot, ProviderUser, RemoteState, TorrentJob,
};

/// Operations every debrid provider supports.
#[async_trait]
pub trait DebridProvider: Send + Sync + std::fmt::Debug {
    /// Lists every job on the account.
    async fn torrents(&self) -> Result<Vec<JobSnapshot>, ProviderError>;

    /// Returns the account owner and premium expiration.
    async fn user(&self) -> Result<ProviderUser, ProviderError>;

    /// Submits a magnet link and returns the provider id.
    async fn add_magnet(&self, magnet: &str) -> Result<String, ProviderError>;

    /// Submits torrent file bytes and returns the provider id.
    async fn add_file(&self, torrent: &[u8]) -> Result<String, ProviderError>;

    /// Lists files that can be downloaded instantly for `hash`.
    async fn available_files(&self, hash: &str) -> Result<Vec<AvailableFile>, ProviderError>;

    /// Applies the selection policy to the job's files and submits the result.
    ///
    /// # Errors
    ///
    /// - `ProviderError::InvalidRequest` - Job has no provider id
    /// - `ProviderError::NoFilesAvailable` - Policy filtered out every file
    /// - `ProviderError::InvalidPattern` - Include or exclude pattern is invalid
    async fn select_files(&self, job: &TorrentJob) -> Result<(), ProviderError>;

    /// Removes a job from the provider.
    async fn delete(&self, provider_id: &str) -> Result<(), ProviderError>;

    /// Turns a hoster link into a direct download URL.
    async fn unrestrict(&self, link: &str) -> Result<String, ProviderError>;

    /// Refreshes the job's remote state.
    ///
    /// `snapshot` is used when it is complete; otherwise fresh details are
    /// fetched. A job the provider no longer knows is marked
    /// [`DELETED_STATUS`] instead of failing.
    async fn update_data(
        &self,
        job: TorrentJob,
        snapshot: Option<JobSnapshot>,
    ) -> Result<TorrentJob, ProviderError>;

    /// Returns the job's download links once they are final.
    async fn download_links(&self, job: &TorrentJob) -> Result<Option<Vec<String>>, ProviderError>;
}
