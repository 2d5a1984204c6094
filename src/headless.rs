//! Headless backend: blank pages of declared size.
//!
//! Used by `signdesk replay` and the shell tests, where the geometry of each
//! page matters but its pixels do not.

use canvas::cache::{PageRasterizer, RasterError, RasterPage, Rotation};

use crate::backend::{BackendError, PdfBackend};

/// Page size in PDF points at scale 1.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

/// Pixel dimensions of a rasterized blank page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankPage {
    pub page: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    pages: Vec<PageBox>,
    open: bool,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new(pages: Vec<PageBox>) -> Self {
        Self { pages, open: false }
    }

    fn open(&mut self) -> Result<u32, BackendError> {
        if self.pages.is_empty() {
            return Err(BackendError::NoPages);
        }
        let count = u32::try_from(self.pages.len()).map_err(|e| BackendError::Open(e.to_string()))?;
        self.open = true;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl PdfBackend for HeadlessBackend {
    async fn open_bytes(&mut self, bytes: Vec<u8>) -> Result<u32, BackendError> {
        if bytes.is_empty() {
            return Err(BackendError::Open("empty document".into()));
        }
        self.open()
    }

    async fn open_url(&mut self, url: &str) -> Result<u32, BackendError> {
        if url.trim().is_empty() {
            return Err(BackendError::Open("empty document URL".into()));
        }
        self.open()
    }
}

impl PageRasterizer for HeadlessBackend {
    type Bitmap = BlankPage;

    async fn rasterize(&self, page: u32, scale: f64, rotation: Rotation) -> Result<RasterPage<BlankPage>, RasterError> {
        if !self.open {
            return Err(RasterError("no document open".into()));
        }
        let page_box = page
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| RasterError(format!("page {page} out of range")))?;
        let (w, h) = if rotation.is_quarter_turn() {
            (page_box.height, page_box.width)
        } else {
            (page_box.width, page_box.height)
        };
        let width = to_pixels(w * scale)?;
        let height = to_pixels(h * scale)?;
        Ok(RasterPage { bitmap: BlankPage { page, width, height }, width, height })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(len: f64) -> Result<u32, RasterError> {
    let rounded = len.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > f64::from(u32::MAX) {
        return Err(RasterError(format!("invalid page dimension {len}")));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
#[path = "headless_test.rs"]
mod tests;
