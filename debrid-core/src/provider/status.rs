//! Provider status normalization and display-name cleanup

use serde::{Deserialize, Serialize};

/// Raw status recorded when the provider no longer knows the job.
pub const DELETED_STATUS: &str = "deleted";

/// Container extensions stripped from provider display names.
pub const VIDEO_EXTENSIONS: [&str; 25] = [
    ".mkv", ".mp4", ".avi", ".m2ts", ".mov", ".wmv", ".asf", ".mpegts", ".ts", ".3gpp", ".flv",
    ".mpeg", ".wtv", ".webm", ".m4v", ".3gp", ".vob", ".ogv", ".rm", ".rmvb", ".divx", ".xvid",
    ".f4v", ".mts", ".mxf",
];

/// Internal job state derived from the provider's raw status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizedStatus {
    Error,
    Processing,
    WaitingForFileSelection,
    Downloading,
    Finished,
    Uploading,
}

impl NormalizedStatus {
    /// Maps a raw Real-Debrid status; anything unrecognized is an error.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "magnet_conversion" => NormalizedStatus::Processing,
            "waiting_files_selection" => NormalizedStatus::WaitingForFileSelection,
            "queued" | "downloading" | "compressing" => NormalizedStatus::Downloading,
            "downloaded" => NormalizedStatus::Finished,
            "uploading" => NormalizedStatus::Uploading,
            "magnet_error" | "error" | "virus" | "dead" => NormalizedStatus::Error,
            _ => NormalizedStatus::Error,
        }
    }
}

impl std::fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NormalizedStatus::Error => "error",
            NormalizedStatus::Processing => "processing",
            NormalizedStatus::WaitingForFileSelection => "waiting for file selection",
            NormalizedStatus::Downloading => "downloading",
            NormalizedStatus::Finished => "finished",
            NormalizedStatus::Uploading => "uploading",
        };
        f.write_str(label)
    }
}

/// Removes one trailing video container extension (exact case).
///
/// A name like `Movie.mkv` becomes a directory name downstream, so the
/// extension is dropped.
pub fn strip_video_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if VIDEO_EXTENSIONS.contains(&&name[index..]) => &name[..index],
        _ => name,
    }
}
