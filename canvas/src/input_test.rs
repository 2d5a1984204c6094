#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_pen() {
    assert_eq!(Tool::default(), Tool::Pen);
}

#[test]
fn tool_all_variants_distinct() {
    let variants = [Tool::Pen, Tool::Eraser, Tool::ImagePlacement, Tool::Select];
    for (i, a) in variants.iter().enumerate() {
        for (j, b) in variants.iter().enumerate() {
            if i == j {
                assert_eq!(a, b);
            } else {
                assert_ne!(a, b);
            }
        }
    }
}

#[test]
fn tool_serde_snake_case() {
    assert_eq!(serde_json::to_string(&Tool::ImagePlacement).unwrap(), "\"image_placement\"");
    let back: Tool = serde_json::from_str("\"eraser\"").unwrap();
    assert_eq!(back, Tool::Eraser);
}

#[test]
fn tool_cursors_are_distinct() {
    let cursors = [Tool::Pen, Tool::Eraser, Tool::ImagePlacement, Tool::Select].map(Tool::cursor);
    for (i, a) in cursors.iter().enumerate() {
        for b in &cursors[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.command());
}

#[test]
fn command_accepts_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Pen);
    assert_eq!(ui.pen_color, crate::consts::DEFAULT_PEN_COLOR);
    assert_eq!(ui.pen_width, crate::consts::DEFAULT_PEN_WIDTH);
    assert_eq!(ui.eraser_radius, crate::consts::DEFAULT_ERASER_RADIUS);
    assert_eq!(ui.signer, Signer::Primary);
    assert_eq!(ui.zoom.factor(), 1.0);
    assert!(ui.pending_image.is_none());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
    assert!(!InputState::default().is_active());
}

#[test]
fn drawing_is_active() {
    let state = InputState::Drawing { stroke: 1, page: 1, last: Point::new(0.0, 0.0) };
    assert!(state.is_active());
}

#[test]
fn erasing_starts_with_empty_trackers() {
    let state = InputState::Erasing {
        removed_strokes: HashSet::new(),
        removed_images: HashSet::new(),
        dirty_pages: BTreeSet::new(),
        touched_pages: BTreeSet::new(),
        last_redraw_ms: None,
    };
    assert!(state.is_active());
    if let InputState::Erasing { removed_strokes, last_redraw_ms, .. } = state {
        assert!(removed_strokes.is_empty());
        assert!(last_redraw_ms.is_none());
    }
}
