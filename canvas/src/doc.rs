//! Document model: ink strokes, placed images, and the in-memory annotation store.
//!
//! This module defines the annotation types layered over a rendered PDF
//! (`Stroke`, `PlacedImage`), the signer tag that partitions them between the
//! primary and secondary signer (`Signer`), the full-state copy used for
//! history (`Snapshot`), and the runtime store that owns all live annotations
//! (`DocStore`).
//!
//! All geometry is in document space (see [`crate::camera`]). Insertion order
//! is draw order: later entries paint over earlier ones, and hit-testing walks
//! the lists back to front.
//!
//! Once the store is locked every mutation becomes a silent no-op.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Identifier of a stroke. Allocated from a per-store counter, never reused.
pub type StrokeId = u64;

/// Identifier of a placed image. Time-ordered (UUID v7).
pub type ImageId = Uuid;

/// Which signer an annotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signer {
    /// The main signer on the document.
    #[default]
    Primary,
    /// A second signer, e.g. a spouse on a joint return.
    Secondary,
}

/// One continuous freehand ink path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    /// 1-based page number.
    pub page: u32,
    /// CSS color string.
    pub color: String,
    /// Line width in document pixels.
    pub stroke_width: f64,
    /// Points in pointer arrival order.
    pub path: Vec<Point>,
    pub signer: Signer,
}

/// A bitmap placed on a page, positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    pub id: ImageId,
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Encoded bitmap as a `data:` URL.
    pub image_data: String,
    pub signer: Signer,
}

impl PlacedImage {
    /// Center of the image's bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `pt` lies inside the axis-aligned bounding box (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// Full point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub strokes: Vec<Stroke>,
    pub images: Vec<PlacedImage>,
}

/// In-memory store of strokes and placed images.
#[derive(Debug, Default)]
pub struct DocStore {
    strokes: Vec<Stroke>,
    images: Vec<PlacedImage>,
    next_stroke_id: StrokeId,
    locked: bool,
}

impl DocStore {
    /// Create an empty, unlocked store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Strokes ---

    /// Start a new stroke at `start`. Returns `None` when locked.
    pub fn add_stroke(&mut self, page: u32, color: &str, width: f64, signer: Signer, start: Point) -> Option<StrokeId> {
        if self.locked {
            return None;
        }
        self.next_stroke_id += 1;
        let id = self.next_stroke_id;
        self.strokes.push(Stroke {
            id,
            page,
            color: color.to_owned(),
            stroke_width: width,
            path: vec![start],
            signer,
        });
        Some(id)
    }

    /// Append a point to a stroke's path. Returns false if locked or the stroke is gone.
    pub fn append_point(&mut self, id: StrokeId, point: Point) -> bool {
        if self.locked {
            return false;
        }
        let Some(stroke) = self.strokes.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        stroke.path.push(point);
        true
    }

    /// Remove every stroke whose id is in `ids`. Returns how many were removed.
    pub fn remove_strokes(&mut self, ids: &HashSet<StrokeId>) -> usize {
        if self.locked || ids.is_empty() {
            return 0;
        }
        let before = self.strokes.len();
        self.strokes.retain(|s| !ids.contains(&s.id));
        before - self.strokes.len()
    }

    // --- Images ---

    /// Place an image with its top-left corner at `(x, y)`. Returns `None` when locked.
    #[allow(clippy::too_many_arguments)]
    pub fn add_image(
        &mut self,
        page: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image_data: &str,
        signer: Signer,
    ) -> Option<ImageId> {
        if self.locked {
            return None;
        }
        let id = Uuid::now_v7();
        self.images.push(PlacedImage { id, page, x, y, width, height, image_data: image_data.to_owned(), signer });
        Some(id)
    }

    /// Move an image's top-left corner. Returns false if locked or the image is gone.
    pub fn move_image(&mut self, id: ImageId, x: f64, y: f64) -> bool {
        if self.locked {
            return false;
        }
        let Some(image) = self.images.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        image.x = x;
        image.y = y;
        true
    }

    /// Remove every image whose id is in `ids`. Returns how many were removed.
    pub fn remove_images(&mut self, ids: &HashSet<ImageId>) -> usize {
        if self.locked || ids.is_empty() {
            return 0;
        }
        let before = self.images.len();
        self.images.retain(|i| !ids.contains(&i.id));
        before - self.images.len()
    }

    // --- Bulk ---

    /// Remove all strokes and images. The stroke id counter keeps counting.
    pub fn clear_all(&mut self) {
        if self.locked {
            return;
        }
        self.strokes.clear();
        self.images.clear();
    }

    /// Remove all strokes and images on one page.
    pub fn clear_page(&mut self, page: u32) {
        if self.locked {
            return;
        }
        self.strokes.retain(|s| s.page != page);
        self.images.retain(|i| i.page != page);
    }

    /// Deep copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { strokes: self.strokes.clone(), images: self.images.clone() }
    }

    /// Replace the contents with `snapshot`. Ignored when locked.
    pub fn restore(&mut self, snapshot: Snapshot) {
        if self.locked {
            return;
        }
        self.strokes = snapshot.strokes;
        self.images = snapshot.images;
    }

    // --- Lock ---

    /// Make the store read-only.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Lift the read-only state.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Drop all contents and the lock, as on editor close. The id counter survives.
    pub fn reset(&mut self) {
        self.strokes.clear();
        self.images.clear();
        self.locked = false;
    }

    // --- Queries ---

    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    #[must_use]
    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    #[must_use]
    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn image(&self, id: ImageId) -> Option<&PlacedImage> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Strokes on `page` in draw order.
    pub fn strokes_on_page(&self, page: u32) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| s.page == page)
    }

    /// Images on `page` in draw order.
    pub fn images_on_page(&self, page: u32) -> impl Iterator<Item = &PlacedImage> {
        self.images.iter().filter(move |i| i.page == page)
    }

    /// Whether any stroke or image is tagged with `signer`.
    #[must_use]
    pub fn has_signer(&self, signer: Signer) -> bool {
        self.strokes.iter().any(|s| s.signer == signer) || self.images.iter().any(|i| i.signer == signer)
    }

    /// Total number of strokes and images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len() + self.images.len()
    }

    /// Returns `true` if the store holds no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.images.is_empty()
    }
}
