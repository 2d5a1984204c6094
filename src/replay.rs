//! Headless replay of a recorded editing session.
//!
//! A script names the document, declares its page sizes, and lists the
//! input events in order. Coordinates are canvas pixels at the script's
//! render scale; the replay maps each page's CSS box 1:1 onto its canvas.

use std::path::Path;

use canvas::camera::{ClientRect, Point, Zoom};
use canvas::doc::Signer;
use canvas::input::{PendingImage, PointerTarget, Tool};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::document::{DocumentFetcher, LoadError};
use crate::headless::{HeadlessBackend, PageBox};
use crate::notify::Notifier;
use crate::session::EditorSession;
use crate::submit::{SaveSink, SubmissionPayload};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("script declares no pages")]
    NoPages,

    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    pub document_url: String,
    pub pages: Vec<PageBox>,
    #[serde(default)]
    pub secondary_required: bool,
    #[serde(default)]
    pub secondary_recorded: bool,
    #[serde(default)]
    pub scale: Option<f64>,
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the file cannot be read or is not a valid script.
    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// One recorded input. `t` is the event timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    Tool { tool: Tool },
    Signer { signer: Signer },
    Color { color: String },
    Width { width: f64 },
    Down { page: u32, x: f64, y: f64, #[serde(default)] t: f64 },
    Move { page: u32, x: f64, y: f64, #[serde(default)] t: f64 },
    Up { #[serde(default)] t: f64 },
    PendingImage { image_data: String, width: f64, height: f64, #[serde(default)] t: f64 },
    Undo { #[serde(default)] t: f64 },
    Redo { #[serde(default)] t: f64 },
    ClearPage { page: u32, #[serde(default)] t: f64 },
    ClearAll { #[serde(default)] t: f64 },
    Zoom { factor: f64 },
    Save,
}

/// What a replay produced.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Annotation set after the last event.
    pub payload: SubmissionPayload,
    /// Whether a `save` event succeeded and locked the editor.
    pub locked: bool,
}

/// Run `script` against a headless backend.
///
/// A failing `save` event is logged and the replay continues, the same way
/// the editor stays usable after a failed save.
///
/// # Errors
///
/// Returns [`ReplayError`] if the script has no pages or the document cannot
/// be loaded.
pub async fn run<F, S>(
    script: ReplayScript,
    mut config: EditorConfig,
    fetcher: F,
    sink: S,
    notifier: Notifier,
) -> Result<ReplayOutcome, ReplayError>
where
    F: DocumentFetcher,
    S: SaveSink,
{
    if script.pages.is_empty() {
        return Err(ReplayError::NoPages);
    }
    if let Some(scale) = script.scale.filter(|s| s.is_finite() && *s > 0.0) {
        config.render_scale = scale;
    }
    config.secondary_required |= script.secondary_required;

    let backend = HeadlessBackend::new(script.pages);
    let mut session = EditorSession::new(config, backend, fetcher, sink, notifier);
    session.load_document(&script.document_url).await?;
    session.set_secondary_recorded(script.secondary_recorded);

    let total = script.events.len();
    for (index, event) in script.events.into_iter().enumerate() {
        debug!(index, ?event, "replay event");
        apply(&mut session, event).await;
    }

    info!(events = total, locked = session.is_locked(), "replay finished");
    Ok(ReplayOutcome { payload: session.payload(), locked: session.is_locked() })
}

async fn apply<F, S>(session: &mut EditorSession<HeadlessBackend, F, S>, event: ReplayEvent)
where
    F: DocumentFetcher,
    S: SaveSink,
{
    match event {
        ReplayEvent::Tool { tool } => {
            session.set_tool(tool, 0.0);
        }
        ReplayEvent::Signer { signer } => session.set_signer(signer),
        ReplayEvent::Color { color } => session.set_pen_color(&color),
        ReplayEvent::Width { width } => session.set_pen_width(width),
        ReplayEvent::Down { page, x, y, t } => {
            if let Some(target) = target(session, page, x, y) {
                session.pointer_down(target, t);
            }
        }
        ReplayEvent::Move { page, x, y, t } => {
            if let Some(target) = target(session, page, x, y) {
                session.pointer_move(target, t);
            }
        }
        ReplayEvent::Up { t } => {
            session.pointer_up(t);
        }
        ReplayEvent::PendingImage { image_data, width, height, t } => {
            session.set_pending_image(PendingImage { image_data, width, height }, t);
        }
        ReplayEvent::Undo { t } => {
            session.undo(t);
        }
        ReplayEvent::Redo { t } => {
            session.redo(t);
        }
        ReplayEvent::ClearPage { page, t } => {
            session.clear_page(page, t);
        }
        ReplayEvent::ClearAll { t } => {
            session.clear_all(t);
        }
        ReplayEvent::Zoom { factor } => {
            session.set_zoom(Zoom::new(factor));
        }
        ReplayEvent::Save => {
            if let Err(e) = session.save().await {
                warn!(error = %e, "replayed save did not complete");
            }
        }
    }
}

/// Pointer target whose CSS box equals the page's canvas.
fn target<F, S>(session: &EditorSession<HeadlessBackend, F, S>, page: u32, x: f64, y: f64) -> Option<PointerTarget>
where
    F: DocumentFetcher,
    S: SaveSink,
{
    let Some(geometry) = session.core().page(page) else {
        warn!(page, "event targets a page that did not render; skipped");
        return None;
    };
    let (width, height) = geometry.canvas_size();
    Some(PointerTarget { page, client: Point::new(x, y), rect: ClientRect::new(0.0, 0.0, width, height) })
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
