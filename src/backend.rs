//! PDF rendering collaborator.
//!
//! The editor never parses PDF bytes itself. A backend opens a document from
//! bytes or directly from its URL and then rasterizes pages on demand through
//! [`PageRasterizer`].

use canvas::cache::PageRasterizer;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The rendering library rejected the document.
    #[error("document open failed: {0}")]
    Open(String),

    /// The document opened but has no pages.
    #[error("document has no pages")]
    NoPages,
}

/// A loaded-document handle plus its page rasterizer.
#[async_trait::async_trait]
pub trait PdfBackend: PageRasterizer + Send + Sync {
    /// Open a document from fetched bytes. Returns the page count.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the bytes are not a loadable document.
    async fn open_bytes(&mut self, bytes: Vec<u8>) -> Result<u32, BackendError>;

    /// Open a document by letting the rendering library load `url` itself.
    /// Returns the page count.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the library cannot load the URL.
    async fn open_url(&mut self, url: &str) -> Result<u32, BackendError>;
}
