//! Input model: tools, modifier keys, UI settings, and the gesture state machine.
//!
//! `Tool` and `UiState` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture being tracked between
//! pointer-down and pointer-up. Trackers that only matter for one gesture
//! (the eraser's removed-set and redraw clock, the drag grab offset) live on
//! the gesture variant and vanish when the gesture ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::camera::{ClientRect, Point, Zoom};
use crate::consts::{DEFAULT_ERASER_RADIUS, DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH};
use crate::doc::{ImageId, Signer, StrokeId};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Freehand ink (default).
    #[default]
    Pen,
    /// Deletes whole strokes and images under the pointer.
    Eraser,
    /// Places the pending image on the next click.
    ImagePlacement,
    /// Picks up and drags placed images.
    Select,
}

impl Tool {
    /// CSS cursor shown over a page while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pen => "crosshair",
            Self::Eraser => "cell",
            Self::ImagePlacement => "copy",
            Self::Select => "default",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux or Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"z"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Where a pointer event landed: which page canvas, and its on-screen box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTarget {
    /// 1-based page number of the canvas under the pointer.
    pub page: u32,
    /// Pointer position in client (CSS) pixels.
    pub client: Point,
    /// The page canvas's bounding client rect at event time.
    pub rect: ClientRect,
}

/// An image chosen by the user, waiting for a click to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    /// Encoded bitmap as a `data:` URL.
    pub image_data: String,
    /// Placement width in document pixels.
    pub width: f64,
    /// Placement height in document pixels.
    pub height: f64,
}

/// Persistent UI state visible to the renderer and the host toolbar.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Ink color for new strokes.
    pub pen_color: String,
    /// Ink width for new strokes, in document pixels.
    pub pen_width: f64,
    /// Eraser hit radius, in document pixels.
    pub eraser_radius: f64,
    /// Signer tag applied to new strokes and images.
    pub signer: Signer,
    /// Display zoom applied to page canvases.
    pub zoom: Zoom,
    /// Image awaiting placement, if any.
    pub pending_image: Option<PendingImage>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            pen_color: DEFAULT_PEN_COLOR.to_owned(),
            pen_width: DEFAULT_PEN_WIDTH,
            eraser_radius: DEFAULT_ERASER_RADIUS,
            signer: Signer::default(),
            zoom: Zoom::default(),
            pending_image: None,
        }
    }
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// commit history on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is inking a stroke with the pen.
    Drawing {
        /// Id of the stroke being extended.
        stroke: StrokeId,
        /// Page the stroke lives on; moves over other pages are ignored.
        page: u32,
        /// Last appended point, the start of the next incremental segment.
        last: Point,
    },
    /// The user is dragging the eraser.
    Erasing {
        /// Strokes already removed during this drag.
        removed_strokes: HashSet<StrokeId>,
        /// Images already removed during this drag.
        removed_images: HashSet<ImageId>,
        /// Pages changed since the last redraw was emitted.
        dirty_pages: BTreeSet<u32>,
        /// Every page changed during this drag.
        touched_pages: BTreeSet<u32>,
        /// Host time of the last emitted redraw, `None` before the first.
        last_redraw_ms: Option<f64>,
    },
    /// The user is moving a placed image.
    DraggingImage {
        /// Id of the image being dragged.
        id: ImageId,
        /// Page the image lives on.
        page: u32,
        /// Pointer position minus image origin at pointer-down.
        grab_offset: Point,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
