//! Shared numeric constants for the canvas crate.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots kept on the undo stack.
pub const HISTORY_LIMIT: usize = 50;

// ── Eraser ──────────────────────────────────────────────────────

/// Default eraser radius in document pixels.
pub const DEFAULT_ERASER_RADIUS: f64 = 10.0;

/// Minimum spacing between eraser redraws during a drag, in milliseconds.
pub const ERASER_REDRAW_THROTTLE_MS: f64 = 50.0;

// ── Pen ─────────────────────────────────────────────────────────

/// Default ink color.
pub const DEFAULT_PEN_COLOR: &str = "#000000";

/// Default ink width in document pixels.
pub const DEFAULT_PEN_WIDTH: f64 = 2.0;

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest display zoom factor.
pub const ZOOM_MIN: f64 = 0.25;

/// Largest display zoom factor.
pub const ZOOM_MAX: f64 = 4.0;

/// Multiplicative step for zoom in / zoom out.
pub const ZOOM_STEP: f64 = 1.25;

// ── Render cache ────────────────────────────────────────────────

/// Scale values are keyed in thousandths (three decimal places).
pub const SCALE_KEY_PRECISION: f64 = 1000.0;
