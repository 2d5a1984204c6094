//! Save submission: the annotation payload and where it goes.

use std::sync::Mutex;
use std::time::Duration;

use canvas::doc::{DocStore, PlacedImage, Signer, Stroke};
use serde::{Deserialize, Serialize};

use crate::config::HttpTimeouts;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// A second signature is required but nothing carries the secondary tag.
    #[error("secondary signature is required before saving")]
    SecondarySignatureMissing,

    /// The editor was already saved and locked.
    #[error("editor is locked")]
    Locked,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// Transport-level failure talking to the save endpoint.
    #[error("save request failed: {0}")]
    Request(String),

    /// The save endpoint answered with a non-success status.
    #[error("save endpoint returned status {status}")]
    Status { status: u16, body: String },

    /// The sink could not hand the payload on.
    #[error("save sink unavailable: {0}")]
    Sink(String),
}

/// Annotations belonging to one signer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignerLayer {
    pub strokes: Vec<Stroke>,
    pub images: Vec<PlacedImage>,
}

impl SignerLayer {
    fn collect(doc: &DocStore, signer: Signer) -> Self {
        Self {
            strokes: doc.strokes().iter().filter(|s| s.signer == signer).cloned().collect(),
            images: doc.images().iter().filter(|i| i.signer == signer).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub width: f64,
    pub height: f64,
}

/// Display and render parameters the annotations were captured under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasMeta {
    pub zoom: f64,
    pub scale: f64,
    pub rotation: u16,
    pub pages: Vec<PageMeta>,
}

/// What a save sends: annotations split by signer, plus canvas geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub primary: SignerLayer,
    pub secondary: SignerLayer,
    pub canvas: CanvasMeta,
}

impl SubmissionPayload {
    #[must_use]
    pub fn build(doc: &DocStore, canvas: CanvasMeta) -> Self {
        Self {
            primary: SignerLayer::collect(doc, Signer::Primary),
            secondary: SignerLayer::collect(doc, Signer::Secondary),
            canvas,
        }
    }
}

/// Destination for a finished annotation set. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist `payload`.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveError`] if the payload was not accepted.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SaveError>;
}

/// POSTs the payload as JSON.
pub struct HttpSaveSink {
    http: reqwest::Client,
    url: String,
}

impl HttpSaveSink {
    /// # Errors
    ///
    /// Returns [`SaveError::ClientBuild`] if the reqwest client fails to build.
    pub fn new(url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, SaveError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| SaveError::ClientBuild(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }
}

#[async_trait::async_trait]
impl SaveSink for HttpSaveSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SaveError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SaveError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SaveError::Status { status: status.as_u16(), body });
        }
        tracing::info!(url = %self.url, status = status.as_u16(), "annotations submitted");
        Ok(())
    }
}

/// Keeps the last submitted payload in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    last: Mutex<Option<SubmissionPayload>>,
}

impl CaptureSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the captured payload, if any.
    #[must_use]
    pub fn take(&self) -> Option<SubmissionPayload> {
        self.last.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[async_trait::async_trait]
impl SaveSink for CaptureSink {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SaveError> {
        let mut slot = self.last.lock().map_err(|e| SaveError::Sink(e.to_string()))?;
        *slot = Some(payload.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod tests;
