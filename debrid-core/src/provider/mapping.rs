//! Copies provider snapshots onto job records

use super::{JobSnapshot, NormalizedStatus, TorrentJob, strip_video_extension};

/// True when the snapshot lacks fields only a detail fetch provides.
pub fn needs_refresh(snapshot: Option<&JobSnapshot>) -> bool {
    match snapshot {
        None => true,
        Some(snapshot) => {
            snapshot.ended_at.is_none()
                || snapshot
                    .display_name
                    .as_deref()
                    .is_none_or(str::is_empty)
        }
    }
}

/// Writes the provider's view of a job into its remote state.
pub fn apply_snapshot(job: &mut TorrentJob, snapshot: &JobSnapshot) {
    let remote = &mut job.remote;

    let name = [&snapshot.display_name, &snapshot.original_display_name]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty());
    if let Some(name) = name {
        remote.name = Some(name.clone());
    }
    if let Some(name) = remote.name.take() {
        remote.name = Some(strip_video_extension(&name).to_string());
    }

    if snapshot.total_bytes > 0 {
        remote.size = Some(snapshot.total_bytes);
    } else if snapshot.original_total_bytes > 0 {
        remote.size = Some(snapshot.original_total_bytes);
    }

    if !snapshot.files.is_empty() {
        match serde_json::to_string(&snapshot.files) {
            Ok(json) => remote.files_json = Some(json),
            Err(e) => tracing::warn!("Failed to serialize files for {}: {}", snapshot.provider_id, e),
        }
    }

    remote.host = snapshot.host.clone();
    remote.split = Some(snapshot.split_size);
    remote.progress = Some(snapshot.progress_percent);
    remote.added = Some(snapshot.added_at);
    remote.ended = snapshot.ended_at;
    remote.speed = snapshot.speed;
    remote.seeders = snapshot.seeder_count;
    remote.status_raw = Some(snapshot.raw_status.clone());
    remote.status = Some(NormalizedStatus::from_raw(&snapshot.raw_status));
}
