//! Network access for tracker list downloads

use async_trait::async_trait;
use url::Url;

/// Failures while downloading the tracker list body.
#[derive(Debug, thiserror::Error)]
pub enum TrackerTransportError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Tracker list {url} returned status {status}")]
    Status { url: String, status: u16 },
}

impl TrackerTransportError {
    /// True when the failure was a timeout rather than a hard error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TrackerTransportError::Timeout { .. })
    }
}

/// Downloads the raw tracker list text.
#[async_trait]
pub trait TrackerListTransport: Send + Sync + std::fmt::Debug {
    /// Fetches the body at `url`.
    ///
    /// # Errors
    ///
    /// - `TrackerTransportError::Timeout` - Request did not finish in time
    /// - `TrackerTransportError::Status` - Server answered with a non-success status
    /// - `TrackerTransportError::Request` - Connection or body read failed
    async fn fetch(&self, url: &Url) -> Result<String, TrackerTransportError>;
}

/// Reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTrackerListTransport {
    client: reqwest::Client,
}

impl HttpTrackerListTransport {
    /// Builds the HTTP client used for tracker list downloads.
    ///
    /// # Errors
    ///
    /// - `TrackerTransportError::Client` - TLS backend or client setup failed
    pub fn new() -> Result<Self, TrackerTransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("debrid/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrackerListTransport for HttpTrackerListTransport {
    async fn fetch(&self, url: &Url) -> Result<String, TrackerTransportError> {
        tracing::debug!("Fetching tracker list from {}", url);

        let request_failed = |e: reqwest::Error| {
            tracing::warn!("Tracker list request to {} failed: {}", url, e);
            if e.is_timeout() {
                TrackerTransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TrackerTransportError::Request {
                    url: url.to_string(),
                    source: e,
                }
            }
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Tracker list {} returned error status: {}", url, status);
            return Err(TrackerTransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_failed)
    }
}
