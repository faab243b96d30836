//! Reqwest implementation of the Real-Debrid API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use super::api::{
    AccountInfo, AddedTorrent, ApiConnector, ApiErrorBody, RealDebridApi, TorrentInfo,
    UNKNOWN_RESOURCE_CODE, UnrestrictedLink,
};
use crate::config::ProviderConfig;
use crate::provider::ProviderError;

/// Real-Debrid REST client bound to one API key.
#[derive(Debug, Clone)]
pub struct HttpRealDebridApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRealDebridApi {
    /// Builds a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Http` - TLS backend or client setup failed
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("debrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ProviderError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends an authenticated request and classifies failures.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Real-Debrid request to {} failed: {}", url, e);
                if e.is_timeout() {
                    ProviderError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    ProviderError::Http {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Real-Debrid {} returned error status {}: {}", url, status, body);
        Err(error_from_response(status.as_u16(), &body, url))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self.send(request, url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                reason: format!("{url}: {e}"),
            })
    }
}

/// Maps a non-success response to a typed error.
///
/// HTTP 404 and the `unknown_ressource` error code both mean the resource is
/// gone.
pub fn error_from_response(status: u16, body: &str, url: &str) -> ProviderError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let error_code = parsed.as_ref().and_then(|parsed| parsed.error_code);

    if status == 404 || error_code == Some(UNKNOWN_RESOURCE_CODE) {
        return ProviderError::NotFound {
            resource: url.to_string(),
        };
    }

    let message = parsed
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| body.trim().to_string());
    ProviderError::Api { status, message }
}

/// Parses the `/time/iso` body, e.g. `2024-05-01T14:00:00+0200`.
pub fn parse_server_time(body: &str) -> Result<DateTime<FixedOffset>, ProviderError> {
    let text = body.trim().trim_matches('"');

    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z"))
        .map_err(|e| ProviderError::InvalidResponse {
            reason: format!("server time {text:?}: {e}"),
        })
}

#[async_trait]
impl RealDebridApi for HttpRealDebridApi {
    async fn torrents(&self, offset: usize, limit: usize) -> Result<Vec<TorrentInfo>, ProviderError> {
        let url = self.url("torrents");
        let request = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("limit", limit)]);

        // An empty account answers 204 with no body
        let response = self.send(request, &url).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                reason: format!("{url}: {e}"),
            })
    }

    async fn torrent_info(&self, id: &str) -> Result<TorrentInfo, ProviderError> {
        let url = self.url(&format!("torrents/info/{}", urlencoding::encode(id)));
        self.json(self.client.get(&url), &url).await
    }

    async fn user(&self) -> Result<AccountInfo, ProviderError> {
        let url = self.url("user");
        self.json(self.client.get(&url), &url).await
    }

    async fn add_magnet(&self, magnet: &str) -> Result<AddedTorrent, ProviderError> {
        let url = self.url("torrents/addMagnet");
        let request = self.client.post(&url).form(&[("magnet", magnet)]);
        self.json(request, &url).await
    }

    async fn add_torrent(&self, torrent: &[u8]) -> Result<AddedTorrent, ProviderError> {
        let url = self.url("torrents/addTorrent");
        let request = self.client.put(&url).body(torrent.to_vec());
        self.json(request, &url).await
    }

    async fn select_files(&self, id: &str, file_ids: &[String]) -> Result<(), ProviderError> {
        let url = self.url(&format!("torrents/selectFiles/{}", urlencoding::encode(id)));
        let request = self
            .client
            .post(&url)
            .form(&[("files", file_ids.join(","))]);
        self.send(request, &url).await.map(|_| ())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        let url = self.url(&format!("torrents/delete/{}", urlencoding::encode(id)));
        self.send(self.client.delete(&url), &url).await.map(|_| ())
    }

    async fn unrestrict_link(&self, link: &str) -> Result<UnrestrictedLink, ProviderError> {
        let url = self.url("unrestrict/link");
        let request = self.client.post(&url).form(&[("link", link)]);
        self.json(request, &url).await
    }

    async fn server_time(&self) -> Result<DateTime<FixedOffset>, ProviderError> {
        let url = self.url("time/iso");
        let response = self.send(self.client.get(&url), &url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                reason: format!("{url}: {e}"),
            })?;
        parse_server_time(&body)
    }
}

/// Connector that reuses one client until the key, URL or timeout changes.
#[derive(Debug, Default)]
pub struct HttpConnector {
    current: Mutex<Option<(ConnectionKey, Arc<HttpRealDebridApi>)>>,
}

#[derive(Debug, Clone, PartialEq)]
struct ConnectionKey {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiConnector for HttpConnector {
    fn connect(
        &self,
        api_key: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn RealDebridApi>, ProviderError> {
        let key = ConnectionKey {
            api_key: api_key.to_string(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        };

        let mut current = self.current.lock();
        if let Some((existing, api)) = current.as_ref()
            && *existing == key
        {
            return Ok(api.clone());
        }

        tracing::debug!("Creating Real-Debrid client for {}", config.base_url);
        let api = Arc::new(HttpRealDebridApi::new(
            &config.base_url,
            api_key,
            config.timeout,
        )?);
        *current = Some((key, api.clone()));
        Ok(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(error_from_response(404, "", "x").is_not_found());
        assert!(
            error_from_response(
                403,
                r#"{"error":"unknown_ressource","error_code":7}"#,
                "x"
            )
            .is_not_found()
        );

        let body = r#"{"error":"service_unavailable","error_code":25}"#;
        let error = error_from_response(503, body, "x");
        assert!(matches!(
            error,
            ProviderError::Api { status: 503, ref message } if message == "service_unavailable"
        ));

        let error = error_from_response(500, "boom", "x");
        assert!(matches!(
            error,
            ProviderError::Api { status: 500, ref message } if message == "boom"
        ));
    }

    #[test]
    fn test_parse_server_time_formats() {
        let compact = parse_server_time("2024-05-01T14:00:00+0200").unwrap();
        assert_eq!(compact.offset().local_minus_utc(), 7200);

        let rfc = parse_server_time("\"2024-05-01T14:00:00+02:00\"\n").unwrap();
        assert_eq!(rfc, compact);

        assert!(parse_server_time("yesterday").is_err());
    }

    #[test]
    fn test_connector_reuses_client_until_config_changes() {
        let connector = HttpConnector::new();
        let mut config = ProviderConfig::default();

        let first = connector.connect("key", &config).unwrap();
        let second = connector.connect("key", &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        config.timeout = Duration::from_secs(1);
        let third = connector.connect("key", &config).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
