//! Download link readiness heuristic

use chrono::{DateTime, TimeDelta, Utc};

use super::TorrentJob;

/// How long a finished job with a single link waits for more links.
pub const SINGLE_LINK_GRACE: TimeDelta = TimeDelta::seconds(60);

/// Decides whether the provider's links for `job` are final.
///
/// Blank links are dropped. The links are final when their count matches
/// the job's selected files or its manual file list, or when there is a
/// single link and the job ended more than [`SINGLE_LINK_GRACE`] before
/// `now`. A job with nothing selected and no manual files is final with no
/// links. Otherwise more links may still appear and `None` is returned.
pub fn ready_links(
    job: &TorrentJob,
    links: Option<Vec<String>>,
    now: DateTime<Utc>,
) -> Option<Vec<String>> {
    let label = job.log_label();
    let links: Vec<String> = links?
        .into_iter()
        .filter(|link| !link.trim().is_empty())
        .collect();

    let files = job.files();
    let selected_count = files.iter().filter(|file| file.selected).count();

    tracing::debug!(
        "Job has {} selected files out of {} files, found {} links, ended: {:?} {}",
        selected_count,
        files.len(),
        links.len(),
        job.remote.ended,
        label
    );

    if selected_count == links.len() {
        tracing::debug!("Matched {} selected files to {} links", selected_count, links.len());
        return Some(links);
    }

    if job.manual_files.len() == links.len() {
        tracing::debug!(
            "Matched {} manual files to {} links",
            job.manual_files.len(),
            links.len()
        );
        return Some(links);
    }

    if links.len() == 1
        && let Some(ended) = job.remote.ended
    {
        let waited = now - ended;
        tracing::debug!(
            "Waiting to see if more links appear, checked for {} seconds",
            waited.num_seconds()
        );
        if waited > SINGLE_LINK_GRACE {
            return Some(links);
        }
    }

    tracing::debug!("Did not find any suitable download links {}", label);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::JobFile;

    fn job_with_files(selected: &[bool]) -> TorrentJob {
        let files: Vec<JobFile> = selected
            .iter()
            .enumerate()
            .map(|(index, selected)| JobFile {
                id: index as u64 + 1,
                path: format!("/file{index}.mkv"),
                size_bytes: 100,
                selected: *selected,
            })
            .collect();

        let mut job = TorrentJob::new("hash");
        job.provider_id = Some("RD1".to_string());
        job.remote.files_json = Some(serde_json::to_string(&files).unwrap());
        job
    }

    fn links(count: usize) -> Option<Vec<String>> {
        Some((0..count).map(|i| format!("https://rd.example/d/{i}")).collect())
    }

    #[test]
    fn test_absent_or_blank_links_are_not_ready() {
        let mut job = job_with_files(&[true]);
        job.manual_files = vec!["a.mkv".to_string()];
        let now = Utc::now();

        assert_eq!(ready_links(&job, None, now), None);
        assert_eq!(ready_links(&job, Some(vec![" ".to_string()]), now), None);
    }

    #[test]
    fn test_no_selected_files_and_no_links_is_ready_and_empty() {
        let now = Utc::now();

        assert_eq!(ready_links(&TorrentJob::new("hash"), Some(vec![]), now), Some(vec![]));
        assert_eq!(
            ready_links(&job_with_files(&[false, false]), Some(vec!["  ".to_string()]), now),
            Some(vec![])
        );
        assert_eq!(ready_links(&TorrentJob::new("hash"), None, now), None);
    }

    #[test]
    fn test_selected_count_match_is_ready() {
        let job = job_with_files(&[true, false, true]);

        assert_eq!(ready_links(&job, links(2), Utc::now()), links(2));
        assert_eq!(ready_links(&job, links(3), Utc::now()), None);
    }

    #[test]
    fn test_blank_links_are_dropped_before_counting() {
        let job = job_with_files(&[true, true]);
        let mut raw = links(2).unwrap();
        raw.insert(1, String::new());

        assert_eq!(ready_links(&job, Some(raw), Utc::now()), links(2));
    }

    #[test]
    fn test_manual_count_match_is_ready() {
        let mut job = job_with_files(&[true, true, true]);
        job.manual_files = vec!["a.mkv".to_string(), "b.mkv".to_string()];

        assert_eq!(ready_links(&job, links(2), Utc::now()), links(2));
    }

    #[test]
    fn test_single_link_waits_for_grace_period() {
        let mut job = job_with_files(&[true, true]);
        let ended = Utc::now();
        job.remote.ended = Some(ended);

        assert_eq!(ready_links(&job, links(1), ended + TimeDelta::seconds(30)), None);
        assert_eq!(ready_links(&job, links(1), ended + TimeDelta::seconds(60)), None);
        assert_eq!(
            ready_links(&job, links(1), ended + TimeDelta::seconds(61)),
            links(1)
        );
    }

    #[test]
    fn test_single_link_without_end_time_is_not_ready() {
        let job = job_with_files(&[true, true]);

        assert_eq!(
            ready_links(&job, links(1), Utc::now() + TimeDelta::hours(1)),
            None
        );
    }
}
