//! Plain-text tracker list parsing

use std::collections::HashSet;

use super::TrackerUrl;

/// Parses a newline separated tracker list.
///
/// Blank lines and `#` comments are skipped, one trailing `/` is removed and
/// invalid URLs are dropped. Duplicates (ignoring case) keep their first
/// position.
pub fn parse_tracker_list(body: &str) -> Vec<TrackerUrl> {
    let mut seen = HashSet::new();
    let mut trackers = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_suffix('/').unwrap_or(line);
        let Some(tracker) = TrackerUrl::parse(line) else {
            tracing::trace!("Skipping invalid tracker line: {}", line);
            continue;
        };

        if seen.insert(tracker.clone()) {
            trackers.push(tracker);
        }
    }

    trackers
}
