//! Per-page render cache for rasterized document pages.
//!
//! Rasterizing a PDF page is the dominant cost in the editor, and every
//! annotation edit triggers a redraw. The cache holds one immutable bitmap per
//! `(page, scale, rotation)` so redraws only blit the background and then paint
//! annotations over it.
//!
//! Entries are never updated in place. A miss always stores a brand-new entry,
//! and the whole cache is dropped when a different document is loaded.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::consts::SCALE_KEY_PRECISION;

/// Page rotation in quarter turns, normalized to 0/90/180/270 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize an arbitrary degree value, rounding to the nearest quarter turn.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Self {
        let quarter = ((f64::from(degrees) / 90.0).round() as i64).rem_euclid(4);
        match quarter {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Whether the page is turned sideways, swapping its width and height.
    #[must_use]
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Cache key. Scale is stored in thousandths so nearly-equal floats share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub scale_milli: i64,
    pub rotation: Rotation,
}

impl PageKey {
    #[must_use]
    pub fn new(page: u32, scale: f64, rotation: Rotation) -> Self {
        Self { page, scale_milli: (scale * SCALE_KEY_PRECISION).round() as i64, rotation }
    }
}

/// A freshly rasterized page as produced by a [`PageRasterizer`].
#[derive(Debug, Clone)]
pub struct RasterPage<B> {
    pub bitmap: B,
    pub width: u32,
    pub height: u32,
}

/// An immutable cache entry. Cloning shares the bitmap.
#[derive(Debug)]
pub struct CachedPage<B> {
    pub bitmap: Arc<B>,
    pub width: u32,
    pub height: u32,
}

impl<B> Clone for CachedPage<B> {
    fn clone(&self) -> Self {
        Self { bitmap: Arc::clone(&self.bitmap), width: self.width, height: self.height }
    }
}

/// Failure reported by a rasterizer for a single page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page rasterization failed: {0}")]
pub struct RasterError(pub String);

/// The page-rasterization collaborator (a PDF rendering library).
pub trait PageRasterizer {
    /// Host bitmap type (an off-screen canvas in the browser).
    type Bitmap;

    /// Render `page` (1-based) at `scale` and `rotation`.
    fn rasterize(
        &self,
        page: u32,
        scale: f64,
        rotation: Rotation,
    ) -> impl Future<Output = Result<RasterPage<Self::Bitmap>, RasterError>>;
}

/// Memoized page bitmaps for one loaded document.
#[derive(Debug)]
pub struct RenderCache<B> {
    entries: HashMap<PageKey, CachedPage<B>>,
}

impl<B> Default for RenderCache<B> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<B> RenderCache<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached bitmap for the key, rasterizing it once on a miss.
    ///
    /// # Errors
    ///
    /// Returns the rasterizer's error on a miss that fails; nothing is cached then.
    pub async fn get_or_render<R>(
        &mut self,
        rasterizer: &R,
        page: u32,
        scale: f64,
        rotation: Rotation,
    ) -> Result<CachedPage<B>, RasterError>
    where
        R: PageRasterizer<Bitmap = B>,
    {
        let key = PageKey::new(page, scale, rotation);
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }
        let raster = rasterizer.rasterize(page, scale, rotation).await?;
        let entry = CachedPage { bitmap: Arc::new(raster.bitmap), width: raster.width, height: raster.height };
        self.entries.insert(key, entry.clone());
        Ok(entry)
    }

    /// Look up an entry without rendering.
    #[must_use]
    pub fn get(&self, key: &PageKey) -> Option<&CachedPage<B>> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &PageKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry. Called when a different document is loaded.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
