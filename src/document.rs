//! Document source: fetches the finished PDF bytes the editor annotates.

use std::time::Duration;

use crate::backend::BackendError;
use crate::config::HttpTimeouts;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("document request failed: {0}")]
    Request(String),

    /// The document host answered with a non-success status.
    #[error("document request returned status {status}")]
    Status { status: u16 },

    /// The response succeeded but carried no bytes.
    #[error("document body is empty")]
    EmptyBody,

    /// Both the byte fetch and the direct URL load failed.
    #[error("document could not be opened (fetch: {fetch}; direct: {direct})")]
    Unavailable { fetch: String, direct: BackendError },
}

/// Source of raw document bytes. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] on transport failure, non-2xx status, or an
    /// empty body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`LoadError::ClientBuild`] if the reqwest client fails to build.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LoadError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status { status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(LoadError::EmptyBody);
        }
        tracing::debug!(%url, len = bytes.len(), "document fetched");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
