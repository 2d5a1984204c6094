//! Hit-testing against strokes and placed images.
//!
//! The eraser uses point sampling: a stroke is hit when any stored path point
//! lies within the radius. Comparisons use squared distances.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::HashSet;

use crate::camera::Point;
use crate::doc::{DocStore, ImageId, PlacedImage, Stroke, StrokeId};

/// Annotations under an eraser position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraseHits {
    pub strokes: HashSet<StrokeId>,
    pub images: HashSet<ImageId>,
}

impl EraseHits {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.images.is_empty()
    }
}

/// Whether any point of `stroke` lies within `radius` of `pt`.
#[must_use]
pub fn stroke_within(stroke: &Stroke, pt: Point, radius: f64) -> bool {
    let radius_sq = radius * radius;
    stroke.path.iter().any(|p| p.dist_sq(pt) <= radius_sq)
}

/// Whether the center of `image` lies within `radius` of `pt`.
#[must_use]
pub fn image_center_within(image: &PlacedImage, pt: Point, radius: f64) -> bool {
    image.center().dist_sq(pt) <= radius * radius
}

/// Collect every stroke and image on `page` the eraser at `pt` would remove,
/// skipping ids already removed earlier in the same drag.
#[must_use]
pub fn eraser_hits(
    doc: &DocStore,
    page: u32,
    pt: Point,
    radius: f64,
    skip_strokes: &HashSet<StrokeId>,
    skip_images: &HashSet<ImageId>,
) -> EraseHits {
    let strokes = doc
        .strokes_on_page(page)
        .filter(|s| !skip_strokes.contains(&s.id))
        .filter(|s| stroke_within(s, pt, radius))
        .map(|s| s.id)
        .collect();
    let images = doc
        .images_on_page(page)
        .filter(|i| !skip_images.contains(&i.id))
        .filter(|i| image_center_within(i, pt, radius))
        .map(|i| i.id)
        .collect();
    EraseHits { strokes, images }
}

/// The topmost image on `page` whose bounding box contains `pt`.
#[must_use]
pub fn image_at(doc: &DocStore, page: u32, pt: Point) -> Option<&PlacedImage> {
    doc.images().iter().rev().find(|i| i.page == page && i.contains(pt))
}
