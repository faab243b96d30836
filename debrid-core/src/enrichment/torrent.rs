//! Tracker merging for decoded torrent containers

use std::collections::HashSet;

use super::Merged;
use super::bencode::{BencodeDict, BencodeValue};
use crate::trackers::TrackerUrl;

const ANNOUNCE: &[u8] = b"announce";
const ANNOUNCE_LIST: &[u8] = b"announce-list";

/// Collects the trackers a torrent already declares.
///
/// All `announce-list` tiers are flattened first, followed by `announce`.
/// Duplicates are kept. Entries that are not byte strings are skipped.
pub fn existing_trackers(dict: &BencodeDict) -> Vec<String> {
    let tiers = dict
        .get(ANNOUNCE_LIST)
        .and_then(BencodeValue::as_list)
        .unwrap_or_default();

    let tier_entries = tiers
        .iter()
        .filter_map(BencodeValue::as_list)
        .flatten()
        .filter_map(BencodeValue::as_bytes);
    let announce = dict.get(ANNOUNCE).and_then(BencodeValue::as_bytes);

    tier_entries
        .chain(announce)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// Rewrites `announce` and `announce-list` to include `trackers`.
///
/// The result is a flat list of single-tracker tiers, unique ignoring case,
/// with existing trackers first. `announce` becomes the first tracker. Every
/// other key is left untouched and in place.
pub fn merge_torrent_trackers(mut dict: BencodeDict, trackers: &[TrackerUrl]) -> Merged<BencodeDict> {
    let mut seen = HashSet::new();
    let mut all_trackers = Vec::new();

    for tracker in existing_trackers(&dict) {
        if seen.insert(tracker.to_lowercase()) {
            all_trackers.push(tracker);
        }
    }

    let mut added = 0;
    for tracker in trackers {
        if seen.insert(tracker.as_str().to_lowercase()) {
            all_trackers.push(tracker.as_str().to_string());
            added += 1;
        }
    }

    match all_trackers.first() {
        Some(primary) => dict.insert(ANNOUNCE, BencodeValue::text(primary)),
        None => {
            dict.remove(ANNOUNCE);
        }
    }

    let tiers = all_trackers
        .iter()
        .map(|tracker| BencodeValue::List(vec![BencodeValue::text(tracker)]))
        .collect();
    dict.insert(ANNOUNCE_LIST, BencodeValue::List(tiers));

    let total = all_trackers.len();
    Merged {
        output: dict,
        added,
        total,
    }
}

/// Drops every tracker from the container.
pub fn clear_trackers(mut dict: BencodeDict) -> BencodeDict {
    dict.remove(ANNOUNCE);
    dict.insert(ANNOUNCE_LIST, BencodeValue::List(Vec::new()));
    dict
}
