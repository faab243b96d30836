//! Provider error type

/// Errors from provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Real-Debrid API key not set in the settings")]
    MissingApiKey,

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No Files Available to Download")]
    NoFilesAvailable,
}

impl ProviderError {
    /// True when the provider reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}
