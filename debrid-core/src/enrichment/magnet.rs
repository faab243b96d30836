//! Magnet link query handling and tracker merging

use std::borrow::Cow;
use std::collections::HashSet;

use super::Merged;
use crate::trackers::TrackerUrl;

const TRACKER_KEY: &str = "tr";

/// Keys whose values are written back exactly as they were received.
const RAW_KEYS: [&str; 2] = ["xt", "dn"];

/// Ordered query-string multimap.
///
/// Keys compare case-insensitively and keep the spelling and position of
/// their first occurrence; values keep their order. Every value remembers
/// both its raw text and its decoded form (`+` and `%XX` decoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<QueryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryEntry {
    Pair { key: String, values: Vec<QueryValue> },
    /// Segment without `=`, kept verbatim
    Bare(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryValue {
    pub raw: String,
    pub decoded: String,
}

impl QueryParams {
    /// Parses a query string (without the leading `?`). Never fails.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();

        for segment in query.split('&').filter(|segment| !segment.is_empty()) {
            let Some((key, raw)) = segment.split_once('=') else {
                params.entries.push(QueryEntry::Bare(segment.to_string()));
                continue;
            };

            let value = QueryValue {
                raw: raw.to_string(),
                decoded: decode_component(raw).into_owned(),
            };
            match params.position(key) {
                Some(index) => {
                    if let QueryEntry::Pair { values, .. } = &mut params.entries[index] {
                        values.push(value);
                    }
                }
                None => params.entries.push(QueryEntry::Pair {
                    key: key.to_string(),
                    values: vec![value],
                }),
            }
        }

        params
    }

    /// Decoded values for `key`, in order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.position(key)
            .and_then(|index| match &self.entries[index] {
                QueryEntry::Pair { values, .. } => {
                    Some(values.iter().map(|value| value.decoded.as_str()).collect())
                }
                QueryEntry::Bare(_) => None,
            })
            .unwrap_or_default()
    }

    /// Removes `key` and returns its values.
    pub fn remove(&mut self, key: &str) -> Vec<QueryValue> {
        match self.position(key) {
            Some(index) => match self.entries.remove(index) {
                QueryEntry::Pair { values, .. } => values,
                QueryEntry::Bare(_) => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Renders every entry as `key=value` segments.
    ///
    /// `xt` and `dn` values are written raw; everything else is encoded from
    /// its decoded form.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        for entry in &self.entries {
            match entry {
                QueryEntry::Bare(token) => segments.push(token.clone()),
                QueryEntry::Pair { key, values } => {
                    let raw = RAW_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k));
                    for value in values {
                        if raw {
                            segments.push(format!("{key}={}", value.raw));
                        } else {
                            segments.push(format!("{key}={}", urlencoding::encode(&value.decoded)));
                        }
                    }
                }
            }
        }
        segments
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            QueryEntry::Pair { key: existing, .. } => existing.eq_ignore_ascii_case(key),
            QueryEntry::Bare(_) => false,
        })
    }
}

/// Decodes `+` as space and `%XX` escapes; invalid UTF-8 is replaced.
fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

/// Adds `trackers` to a magnet link.
///
/// Existing `tr` values come first, then new trackers that are not already
/// present (ignoring case). Malformed query syntax is carried through rather
/// than rejected.
pub fn merge_magnet_trackers(magnet: &str, trackers: &[TrackerUrl]) -> Merged<String> {
    let Some((scheme, query)) = magnet.split_once('?').filter(|(_, query)| !query.is_empty())
    else {
        let mut output = magnet.to_string();
        if !magnet.contains('?') {
            output.push('?');
        }
        let params: Vec<String> = trackers
            .iter()
            .map(|tracker| format!("{TRACKER_KEY}={}", urlencoding::encode(tracker.as_str())))
            .collect();
        output.push_str(&params.join("&"));

        return Merged {
            output,
            added: trackers.len(),
            total: trackers.len(),
        };
    };

    let mut params = QueryParams::parse(query);

    let mut seen = HashSet::new();
    let mut all_trackers: Vec<String> = Vec::new();
    for existing in params.remove(TRACKER_KEY) {
        if seen.insert(existing.decoded.to_lowercase()) {
            all_trackers.push(existing.decoded);
        }
    }

    let mut added = 0;
    for tracker in trackers {
        if seen.insert(tracker.as_str().to_lowercase()) {
            all_trackers.push(tracker.as_str().to_string());
            added += 1;
        }
    }

    let mut segments = params.segments();
    segments.extend(
        all_trackers
            .iter()
            .map(|tracker| format!("{TRACKER_KEY}={}", urlencoding::encode(tracker))),
    );

    Merged {
        output: format!("{scheme}?{}", segments.join("&")),
        added,
        total: all_trackers.len(),
    }
}
