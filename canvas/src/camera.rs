//! Coordinate mapping between client (CSS) pixels, canvas pixels and document space.
//!
//! Three frames are involved:
//!
//! - **Client space**: CSS pixels as reported by pointer events.
//! - **Canvas space**: the backing-store pixel grid of a page canvas. The page
//!   is rasterized into it at the render scale and turned clockwise by the
//!   page rotation.
//! - **Document space**: the unrotated page at scale 1. Every stored stroke
//!   point and image position lives here, so stored geometry stays put when
//!   the page is re-rendered at another scale or rotation.
//!
//! A pointer position is first rescaled by `pixel / css` on each axis into
//! canvas space, then carried through the inverse of the page transform
//! described by [`PageGeometry`].

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::cache::Rotation;
use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either client or document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn dist_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// On-screen bounding rectangle of a page canvas, in CSS pixels.
///
/// Mirrors the fields of a DOM `getBoundingClientRect()` result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// How a page's document space lands on its canvas backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Unrotated page width at scale 1.
    pub width: f64,
    /// Unrotated page height at scale 1.
    pub height: f64,
    pub scale: f64,
    pub rotation: Rotation,
}

impl PageGeometry {
    #[must_use]
    pub fn new(width: f64, height: f64, scale: f64, rotation: Rotation) -> Self {
        Self { width, height, scale, rotation }
    }

    /// Unscaled, unrotated page: canvas space and document space coincide.
    #[must_use]
    pub fn identity(width: f64, height: f64) -> Self {
        Self::new(width, height, 1.0, Rotation::Deg0)
    }

    /// Recover a page's geometry from the pixel size of its rendered canvas.
    #[must_use]
    pub fn from_canvas(canvas_width: f64, canvas_height: f64, scale: f64, rotation: Rotation) -> Self {
        let (w, h) = if rotation.is_quarter_turn() { (canvas_height, canvas_width) } else { (canvas_width, canvas_height) };
        Self::new(w / scale, h / scale, scale, rotation)
    }

    /// Backing-store size of the page canvas.
    #[must_use]
    pub fn canvas_size(self) -> (f64, f64) {
        let (w, h) = (self.width * self.scale, self.height * self.scale);
        if self.rotation.is_quarter_turn() { (h, w) } else { (w, h) }
    }

    /// Affine map from document to canvas space as `[a, b, c, d, e, f]`, the
    /// argument order of `CanvasRenderingContext2d::setTransform`.
    #[must_use]
    pub fn transform(self) -> [f64; 6] {
        let (s, w, h) = (self.scale, self.width, self.height);
        match self.rotation {
            Rotation::Deg0 => [s, 0.0, 0.0, s, 0.0, 0.0],
            Rotation::Deg90 => [0.0, s, -s, 0.0, s * h, 0.0],
            Rotation::Deg180 => [-s, 0.0, 0.0, -s, s * w, s * h],
            Rotation::Deg270 => [0.0, -s, s, 0.0, 0.0, s * w],
        }
    }

    #[must_use]
    pub fn to_canvas(self, doc: Point) -> Point {
        let [a, b, c, d, e, f] = self.transform();
        Point { x: a * doc.x + c * doc.y + e, y: b * doc.x + d * doc.y + f }
    }

    #[must_use]
    pub fn to_document(self, canvas: Point) -> Point {
        let (u, v) = (canvas.x / self.scale, canvas.y / self.scale);
        let (x, y) = match self.rotation {
            Rotation::Deg0 => (u, v),
            Rotation::Deg90 => (v, self.height - u),
            Rotation::Deg180 => (self.width - u, self.height - v),
            Rotation::Deg270 => (self.width - v, u),
        };
        Point { x, y }
    }

    fn is_valid(self) -> bool {
        [self.width, self.height, self.scale].iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Convert a client-space pointer position into canvas space.
///
/// Returns `None` when any input is non-finite, the CSS box is degenerate, or
/// the mapped point falls outside the canvas backing store.
#[must_use]
pub fn screen_to_canvas(client: Point, rect: ClientRect, pixel_width: f64, pixel_height: f64) -> Option<Point> {
    if !client.is_finite() || !(rect.left.is_finite() && rect.top.is_finite()) {
        return None;
    }
    if !(rect.width > 0.0 && rect.height > 0.0 && pixel_width > 0.0 && pixel_height > 0.0) {
        return None;
    }

    let scale_x = pixel_width / rect.width;
    let scale_y = pixel_height / rect.height;
    let px = Point { x: (client.x - rect.left) * scale_x, y: (client.y - rect.top) * scale_y };

    if !px.is_finite() {
        return None;
    }
    if px.x < 0.0 || px.y < 0.0 || px.x > pixel_width || px.y > pixel_height {
        return None;
    }
    Some(px)
}

/// Convert a canvas-space point back to client space for the given canvas box.
#[must_use]
pub fn canvas_to_screen(px: Point, rect: ClientRect, pixel_width: f64, pixel_height: f64) -> Point {
    Point { x: rect.left + px.x * rect.width / pixel_width, y: rect.top + px.y * rect.height / pixel_height }
}

/// Convert a client-space pointer position into document space for a page.
///
/// Same rejection rules as [`screen_to_canvas`], checked against the rotated,
/// scaled canvas. A geometry with a non-positive size or scale maps nothing.
#[must_use]
pub fn screen_to_document(client: Point, rect: ClientRect, geometry: PageGeometry) -> Option<Point> {
    if !geometry.is_valid() {
        return None;
    }
    let (w, h) = geometry.canvas_size();
    screen_to_canvas(client, rect, w, h).map(|px| geometry.to_document(px))
}

/// Convert a document-space point to client space, e.g. to position an overlay.
#[must_use]
pub fn document_to_screen(doc: Point, rect: ClientRect, geometry: PageGeometry) -> Point {
    let (w, h) = geometry.canvas_size();
    canvas_to_screen(geometry.to_canvas(doc), rect, w, h)
}

/// Display zoom factor applied to page canvases by the host layout.
///
/// Zoom only changes the CSS size of each canvas; stored geometry is unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom(f64);

impl Default for Zoom {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Zoom {
    /// Build a zoom factor, clamped to the supported range. Non-finite input resets to 1.
    #[must_use]
    pub fn new(factor: f64) -> Self {
        if factor.is_finite() { Self(factor.clamp(ZOOM_MIN, ZOOM_MAX)) } else { Self::default() }
    }

    #[must_use]
    pub fn factor(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn zoom_in(self) -> Self {
        Self::new(self.0 * ZOOM_STEP)
    }

    #[must_use]
    pub fn zoom_out(self) -> Self {
        Self::new(self.0 / ZOOM_STEP)
    }

    /// CSS size of a canvas whose backing store is `pixels` wide.
    #[must_use]
    pub fn css_len(self, pixels: f64) -> f64 {
        pixels * self.0
    }
}
