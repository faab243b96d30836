//! Centralized configuration for the debrid layer.
//!
//! Settings are grouped by component and can be swapped at runtime through
//! [`LiveConfig`]. Components never keep their own copy: they read the
//! current value through [`ConfigSource`] on every call.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// Default Real-Debrid REST endpoint.
pub const REAL_DEBRID_API_URL: &str = "https://api.real-debrid.com/rest/1.0";

/// Central configuration for all debrid components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebridConfig {
    pub trackers: TrackerEnrichmentConfig,
    pub provider: ProviderConfig,
}

/// Tracker list enrichment settings.
///
/// Controls where the extra tracker list comes from and how long a fetched
/// list may be reused.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerEnrichmentConfig {
    /// Plain-text tracker list location (None = enrichment disabled)
    pub list_url: Option<String>,
    /// Cache lifetime in minutes; zero or negative disables caching
    pub cache_expiration_minutes: i64,
}

impl Default for TrackerEnrichmentConfig {
    fn default() -> Self {
        Self {
            list_url: None,
            cache_expiration_minutes: 60,
        }
    }
}

/// Remote debrid provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// API token used for bearer authentication
    pub api_key: Option<String>,
    /// Per-request timeout for provider calls
    pub timeout: Duration,
    /// REST base URL, overridable for testing against a local server
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout: Duration::from_secs(30),
            base_url: REAL_DEBRID_API_URL.to_string(),
        }
    }
}

impl DebridConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparseable numeric values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DEBRID_TRACKER_LIST_URL")
            && !url.trim().is_empty()
        {
            config.trackers.list_url = Some(url);
        }

        if let Ok(minutes) = std::env::var("DEBRID_TRACKER_CACHE_MINUTES")
            && let Ok(minutes) = minutes.trim().parse::<i64>()
        {
            config.trackers.cache_expiration_minutes = minutes;
        }

        if let Ok(api_key) = std::env::var("DEBRID_API_KEY")
            && !api_key.trim().is_empty()
        {
            config.provider.api_key = Some(api_key);
        }

        if let Ok(timeout) = std::env::var("DEBRID_PROVIDER_TIMEOUT")
            && let Ok(seconds) = timeout.trim().parse::<u64>()
        {
            config.provider.timeout = Duration::from_secs(seconds);
        }

        if let Ok(base_url) = std::env::var("DEBRID_API_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.provider.base_url = base_url;
        }

        config
    }

    /// Creates a configuration for tests: no tracker source, caching on,
    /// short provider timeout.
    pub fn for_testing() -> Self {
        Self {
            trackers: TrackerEnrichmentConfig {
                list_url: None,
                cache_expiration_minutes: 5,
            },
            provider: ProviderConfig {
                api_key: Some("test-api-key".to_string()),
                timeout: Duration::from_secs(5),
                base_url: REAL_DEBRID_API_URL.to_string(),
            },
        }
    }
}

/// Read access to configuration that may change without notice.
pub trait ConfigSource: Send + Sync {
    /// Returns the configuration as it is right now.
    fn current(&self) -> DebridConfig;
}

/// Runtime-mutable configuration handle shared between components.
#[derive(Debug, Default)]
pub struct LiveConfig {
    inner: RwLock<DebridConfig>,
}

impl LiveConfig {
    /// Wraps an initial configuration.
    pub fn new(config: DebridConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Wraps an initial configuration in an `Arc` ready for injection.
    pub fn shared(config: DebridConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Applies an in-place change visible to every subsequent reader.
    pub fn update(&self, change: impl FnOnce(&mut DebridConfig)) {
        change(&mut *self.inner.write());
    }

    /// Replaces the whole configuration.
    pub fn replace(&self, config: DebridConfig) {
        *self.inner.write() = config;
    }
}

impl ConfigSource for LiveConfig {
    fn current(&self) -> DebridConfig {
        self.inner.read().clone()
    }
}
