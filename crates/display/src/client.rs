//! Fetching the published snapshot from the display server.
//!
//! [`ConfigSource`] is the seam the poller depends on; [`HttpConfigSource`]
//! is the `reqwest` implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use vox_core::snapshot::PublishedSnapshot;

/// Something that can produce the latest published snapshot.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// The latest snapshot, or `None` when there is nothing to show: the
    /// server is unreachable, answered with an error, sent something
    /// unparsable, or has not published yet.
    async fn fetch_config(&self) -> Option<PublishedSnapshot>;
}

/// Errors from a single config fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("Display server returned status {0}")]
    HttpStatus(u16),

    /// The body was not a snapshot.
    #[error("Invalid config body: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP client for `GET /api/config`.
pub struct HttpConfigSource {
    client: reqwest::Client,
    config_url: String,
}

impl HttpConfigSource {
    /// Create a client for the server at `server_url`, e.g.
    /// `http://127.0.0.1:8080`. Every request is bounded by `timeout`.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config_url: format!("{}/api/config", server_url.trim_end_matches('/')),
        })
    }

    /// Fetch once, reporting why nothing came back.
    ///
    /// `Ok(None)` means the server has not published yet (`{}` body).
    pub async fn try_fetch(&self) -> Result<Option<PublishedSnapshot>, FetchError> {
        let response = self.client.get(&self.config_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        if is_unpublished(&value) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch_config(&self) -> Option<PublishedSnapshot> {
        match self.try_fetch().await {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::debug!("Nothing published yet");
                None
            }
            Err(e) => {
                tracing::warn!(url = %self.config_url, error = %e, "Config fetch failed");
                None
            }
        }
    }
}

/// `{}` and `null` both mean "nothing published".
fn is_unpublished(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
