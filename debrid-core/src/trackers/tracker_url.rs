//! Validated announce URLs

use std::fmt;
use std::hash::{Hash, Hasher};

use url::Url;

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "udp"];

/// Absolute announce URL accepted for enrichment.
///
/// Equality and hashing ignore ASCII case, so `HTTP://Tracker.Example/announce`
/// and `http://tracker.example/announce` are the same tracker.
#[derive(Debug, Clone, Eq)]
pub struct TrackerUrl(String);

impl TrackerUrl {
    /// Validates a candidate announce URL.
    ///
    /// Returns `None` unless the candidate is an absolute `http`, `https` or
    /// `udp` URL with a plain host name, and contains no `..`, backslash or
    /// control characters. Surrounding whitespace is trimmed first.
    pub fn parse(candidate: &str) -> Option<Self> {
        let candidate = candidate.trim();
        if candidate.is_empty()
            || candidate.contains("..")
            || candidate.contains('\\')
            || candidate.chars().any(char::is_control)
        {
            return None;
        }

        let parsed = Url::parse(candidate).ok()?;
        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return None;
        }

        let host = parsed.host_str()?;
        if host.is_empty()
            || !host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'))
        {
            return None;
        }

        Some(Self(candidate.to_string()))
    }

    /// The URL exactly as it was accepted.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for TrackerUrl {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for TrackerUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl AsRef<str> for TrackerUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
