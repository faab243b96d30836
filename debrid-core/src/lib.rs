//! Debrid Core - provider integration and tracker enrichment
//!
//! This crate maps a remote debrid provider's job representation into a
//! stable internal model, enforces file-selection policy, and injects extra
//! trackers into magnet links and torrent files before submission.

pub mod config;
pub mod enrichment;
pub mod provider;
pub mod tracing_setup;
pub mod trackers;

// Re-export main types for convenient access
pub use config::{ConfigSource, DebridConfig, LiveConfig};
pub use enrichment::{EnrichmentError, TrackerEnricher};
pub use provider::real_debrid::RealDebridClient;
pub use provider::{DebridProvider, JobSnapshot, NormalizedStatus, ProviderError, TorrentJob};
pub use trackers::{TrackerListError, TrackerListFetcher, TrackerSource, TrackerUrl};

/// Errors that can bubble up from any debrid subsystem.
#[derive(Debug, thiserror::Error)]
pub enum DebridError {
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Tracker list error: {0}")]
    Trackers(#[from] TrackerListError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DebridError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            DebridError::Enrichment(e) => match e {
                EnrichmentError::EmptyTorrent => "Torrent file is empty".to_string(),
                EnrichmentError::InvalidTorrent { source } => {
                    format!("Invalid torrent file: {source}")
                }
                EnrichmentError::Trackers(_) => "Tracker list could not be fetched".to_string(),
            },
            DebridError::Trackers(_) => "Tracker list could not be fetched".to_string(),
            DebridError::Provider(e) => match e {
                ProviderError::MissingApiKey => "No provider API key configured".to_string(),
                ProviderError::NotFound { resource } => format!("{resource} not found on provider"),
                ProviderError::NoFilesAvailable => "No files available to download".to_string(),
                ProviderError::InvalidPattern { pattern, .. } => {
                    format!("Invalid file pattern: {pattern}")
                }
                _ => "Provider error occurred".to_string(),
            },
            DebridError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DebridError::Enrichment(
                EnrichmentError::EmptyTorrent | EnrichmentError::InvalidTorrent { .. }
            ) | DebridError::Provider(
                ProviderError::MissingApiKey
                    | ProviderError::InvalidRequest { .. }
                    | ProviderError::InvalidPattern { .. }
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, DebridError>;
