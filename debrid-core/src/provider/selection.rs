//! File selection policy

use regex::Regex;

use super::{DownloadAction, JobFile, ProviderError, TorrentJob};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Chooses which of `files` the provider should download for `job`.
///
/// Manual jobs keep files whose path ends with a manual entry, falling back
/// to every file when none match. Other jobs then drop files not larger than
/// the minimum size. Finally the include pattern keeps matches, or, when no
/// include pattern is set, the exclude pattern drops matches.
///
/// # Errors
///
/// - `ProviderError::InvalidPattern` - Include or exclude pattern is not a valid regex
/// - `ProviderError::NoFilesAvailable` - Every file was filtered out
pub fn select_job_files(job: &TorrentJob, files: &[JobFile]) -> Result<Vec<JobFile>, ProviderError> {
    let label = job.log_label();
    tracing::debug!("Selecting files {}", label);

    let mut selected: Vec<JobFile> = match job.download_action {
        DownloadAction::Manual => {
            tracing::debug!("Selecting manual selected files {}", label);
            files
                .iter()
                .filter(|file| {
                    job.manual_files
                        .iter()
                        .any(|manual| file.path.ends_with(manual.as_str()))
                })
                .cloned()
                .collect()
        }
        DownloadAction::All => {
            tracing::debug!("Selecting all files {}", label);
            files.to_vec()
        }
    };

    if selected.is_empty() {
        tracing::debug!("Filtered all files out, downloading all files instead {}", label);
        selected = files.to_vec();
    }

    tracing::debug!("Selecting {}/{} files {}", selected.len(), files.len(), label);

    if job.download_action != DownloadAction::Manual && job.download_min_size_mb > 0 {
        let min_size = job.download_min_size_mb.saturating_mul(BYTES_PER_MB);
        tracing::debug!("Determining which files are over {} bytes {}", min_size, label);

        selected.retain(|file| file.size_bytes > min_size);
        tracing::debug!(
            "Found {} files that match the minimum file size {}",
            selected.len(),
            label
        );
    }

    if let Some(pattern) = non_blank(job.include_pattern.as_deref()) {
        let regex = compile(pattern)?;
        tracing::debug!("Including only files matching {} {}", pattern, label);
        selected.retain(|file| regex.is_match(&file.path));
        tracing::debug!("Found {} files that match the pattern {}", selected.len(), label);
    } else if let Some(pattern) = non_blank(job.exclude_pattern.as_deref()) {
        let regex = compile(pattern)?;
        tracing::debug!("Ignoring files matching {} {}", pattern, label);
        selected.retain(|file| !regex.is_match(&file.path));
        tracing::debug!("Found {} files that match the pattern {}", selected.len(), label);
    }

    if selected.is_empty() {
        tracing::debug!("Filtered all files out, downloading no files {}", label);
        return Err(ProviderError::NoFilesAvailable);
    }

    for file in &selected {
        tracing::debug!("{}: {} ({}b)", file.id, file.path, file.size_bytes);
    }

    Ok(selected)
}

fn non_blank(pattern: Option<&str>) -> Option<&str> {
    pattern.filter(|pattern| !pattern.trim().is_empty())
}

fn compile(pattern: &str) -> Result<Regex, ProviderError> {
    Regex::new(pattern).map_err(|source| ProviderError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(id: u64, path: &str, size_bytes: u64) -> JobFile {
        JobFile {
            id,
            path: path.to_string(),
            size_bytes,
            selected: false,
        }
    }

    fn sample_files() -> Vec<JobFile> {
        vec![
            file(1, "/Show/sample.mkv", 5 * MB),
            file(2, "/Show/episode1.mkv", 50 * MB),
            file(3, "/Show/episode2.mkv", 200 * MB),
        ]
    }

    fn ids(files: &[JobFile]) -> Vec<u64> {
        files.iter().map(|file| file.id).collect()
    }

    #[test]
    fn test_min_size_keeps_larger_files() {
        let mut job = TorrentJob::new("hash");
        job.download_min_size_mb = 10;

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![2, 3]);
    }

    #[test]
    fn test_min_size_is_strictly_greater() {
        let mut job = TorrentJob::new("hash");
        job.download_min_size_mb = 50;

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![3]);
    }

    #[test]
    fn test_include_pattern_matching_nothing_fails() {
        let mut job = TorrentJob::new("hash");
        job.include_pattern = Some(r"\.iso$".to_string());

        let error = select_job_files(&job, &sample_files()).unwrap_err();

        assert!(matches!(error, ProviderError::NoFilesAvailable));
    }

    #[test]
    fn test_include_pattern_wins_over_exclude() {
        let mut job = TorrentJob::new("hash");
        job.include_pattern = Some("episode".to_string());
        job.exclude_pattern = Some("episode1".to_string());

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![2, 3]);
    }

    #[test]
    fn test_exclude_pattern_drops_matches() {
        let mut job = TorrentJob::new("hash");
        job.include_pattern = Some("   ".to_string());
        job.exclude_pattern = Some("sample".to_string());

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![2, 3]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut job = TorrentJob::new("hash");
        job.exclude_pattern = Some("([unclosed".to_string());

        let error = select_job_files(&job, &sample_files()).unwrap_err();

        assert!(matches!(
            error,
            ProviderError::InvalidPattern { ref pattern, .. } if pattern == "([unclosed"
        ));
    }

    #[test]
    fn test_manual_selection_by_path_suffix_ignores_min_size() {
        let mut job = TorrentJob::new("hash");
        job.download_action = DownloadAction::Manual;
        job.download_min_size_mb = 100;
        job.manual_files = vec!["sample.mkv".to_string(), "episode1.mkv".to_string()];

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![1, 2]);
    }

    #[test]
    fn test_manual_selection_without_matches_falls_back_to_all() {
        let mut job = TorrentJob::new("hash");
        job.download_action = DownloadAction::Manual;
        job.manual_files = vec!["missing.mkv".to_string()];

        let selected = select_job_files(&job, &sample_files()).unwrap();

        assert_eq!(ids(&selected), vec![1, 2, 3]);
    }

    #[test]
    fn test_no_files_at_all_fails() {
        let job = TorrentJob::new("hash");

        assert!(matches!(
            select_job_files(&job, &[]),
            Err(ProviderError::NoFilesAvailable)
        ));
    }
}
