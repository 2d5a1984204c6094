//! Editor session: one loaded document and everything drawn on it.
//!
//! DESIGN
//! ======
//! The session is the host around [`EngineCore`]. It loads the document
//! (fetch bytes first, fall back to a direct URL load), rasterizes pages
//! through the render cache, forwards input to the engine, and runs the
//! save/lock transition. It never paints; the actions the engine returns are
//! handed back to the caller untouched, apart from turning "nothing to
//! undo/redo" into toasts.

use canvas::cache::{RenderCache, Rotation};
use canvas::camera::Zoom;
use canvas::doc::Signer;
use canvas::engine::{Action, EngineCore};
use canvas::input::{Key, Modifiers, PendingImage, PointerTarget, Tool};
use tracing::{debug, info, warn};

use crate::backend::PdfBackend;
use crate::config::EditorConfig;
use crate::document::{DocumentFetcher, LoadError};
use crate::notify::Notifier;
use crate::submit::{CanvasMeta, PageMeta, SaveError, SaveSink, SubmissionPayload};

pub struct EditorSession<B: PdfBackend, F, S> {
    core: EngineCore,
    cache: RenderCache<B::Bitmap>,
    backend: B,
    fetcher: F,
    sink: S,
    notifier: Notifier,
    config: EditorConfig,
    rotation: Rotation,
    page_count: u32,
    secondary_recorded: bool,
}

impl<B, F, S> EditorSession<B, F, S>
where
    B: PdfBackend,
    F: DocumentFetcher,
    S: SaveSink,
{
    pub fn new(config: EditorConfig, backend: B, fetcher: F, sink: S, notifier: Notifier) -> Self {
        let mut session = Self {
            core: EngineCore::new(),
            cache: RenderCache::new(),
            backend,
            fetcher,
            sink,
            notifier,
            config,
            rotation: Rotation::Deg0,
            page_count: 0,
            secondary_recorded: false,
        };
        session.apply_ui_defaults();
        session
    }

    // =========================================================================
    // DOCUMENT
    // =========================================================================

    /// Load the document at `url` and render every page.
    ///
    /// Any previous document is closed first. The bytes are fetched over
    /// HTTP; if that fails (or the backend rejects them) the backend is asked
    /// to load the URL itself.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Unavailable`] when both paths fail. An error toast
    /// has already been shown and the editor is left empty.
    pub async fn load_document(&mut self, url: &str) -> Result<u32, LoadError> {
        self.close();

        let pages = match self.open(url).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(%url, error = %e, "document load failed");
                self.notifier.error("The document could not be loaded.");
                return Err(e);
            }
        };
        self.page_count = pages;
        let rendered = self.render_pages().await;
        info!(%url, pages, rendered, "document loaded");
        Ok(pages)
    }

    async fn open(&mut self, url: &str) -> Result<u32, LoadError> {
        let fetch_error = match self.fetcher.fetch(url).await {
            Ok(bytes) => match self.backend.open_bytes(bytes).await {
                Ok(pages) => return Ok(pages),
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };
        warn!(%url, error = %fetch_error, "document fetch failed; loading URL directly");
        self.backend
            .open_url(url)
            .await
            .map_err(|direct| LoadError::Unavailable { fetch: fetch_error, direct })
    }

    /// Rasterize every page at the current scale and rotation, recording each
    /// page's geometry with the engine. A page that fails to render is
    /// logged and skipped. Returns the number of pages rendered.
    pub async fn render_pages(&mut self) -> u32 {
        let mut rendered = 0;
        for page in 1..=self.page_count {
            match self
                .cache
                .get_or_render(&self.backend, page, self.config.render_scale, self.rotation)
                .await
            {
                Ok(cached) => {
                    self.core.set_rendered_page(
                        page,
                        cached.width,
                        cached.height,
                        self.config.render_scale,
                        self.rotation,
                    );
                    rendered += 1;
                }
                Err(e) => warn!(page, error = %e, "page render failed; skipping"),
            }
        }
        rendered
    }

    /// Rotate the pages and re-render. Annotations are stored unrotated, so
    /// they turn with the page and stay under the pointer.
    pub async fn set_rotation(&mut self, rotation: Rotation) -> u32 {
        if rotation == self.rotation {
            return self.page_count;
        }
        self.rotation = rotation;
        self.render_pages().await
    }

    /// Tear down the editor: annotations, history, cached pages, pending
    /// placement and any open gesture are discarded without committing.
    pub fn close(&mut self) {
        self.core.reset();
        self.cache.clear();
        self.page_count = 0;
        self.rotation = Rotation::Deg0;
        self.secondary_recorded = false;
        self.apply_ui_defaults();
        debug!("editor closed");
    }

    fn apply_ui_defaults(&mut self) {
        self.core.set_pen_color(&self.config.pen_color);
        self.core.set_pen_width(self.config.pen_width);
        self.core.set_eraser_radius(self.config.eraser_radius);
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    pub fn pointer_down(&mut self, target: PointerTarget, time_ms: f64) -> Vec<Action> {
        self.core.on_pointer_down(target, time_ms)
    }

    pub fn pointer_move(&mut self, target: PointerTarget, time_ms: f64) -> Vec<Action> {
        self.core.on_pointer_move(target, time_ms)
    }

    pub fn pointer_up(&mut self, time_ms: f64) -> Vec<Action> {
        self.core.on_pointer_up(time_ms)
    }

    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers, time_ms: f64) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers, time_ms);
        self.notice(&actions);
        actions
    }

    pub fn set_tool(&mut self, tool: Tool, time_ms: f64) -> Vec<Action> {
        self.core.set_tool(tool, time_ms)
    }

    pub fn set_signer(&mut self, signer: Signer) {
        self.core.set_signer(signer);
    }

    pub fn set_pen_color(&mut self, color: &str) {
        self.core.set_pen_color(color);
    }

    pub fn set_pen_width(&mut self, width: f64) {
        self.core.set_pen_width(width);
    }

    pub fn set_zoom(&mut self, zoom: Zoom) -> Vec<Action> {
        self.core.set_zoom(zoom)
    }

    pub fn set_pending_image(&mut self, image: PendingImage, time_ms: f64) -> Vec<Action> {
        self.core.set_pending_image(image, time_ms)
    }

    pub fn undo(&mut self, time_ms: f64) -> Vec<Action> {
        let actions = self.core.undo(time_ms);
        self.notice(&actions);
        actions
    }

    pub fn redo(&mut self, time_ms: f64) -> Vec<Action> {
        let actions = self.core.redo(time_ms);
        self.notice(&actions);
        actions
    }

    pub fn clear_page(&mut self, page: u32, time_ms: f64) -> Vec<Action> {
        self.core.clear_page(page, time_ms)
    }

    pub fn clear_all(&mut self, time_ms: f64) -> Vec<Action> {
        self.core.clear_all(time_ms)
    }

    fn notice(&self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::NothingToUndo => self.notifier.info("Nothing to undo"),
                Action::NothingToRedo => self.notifier.info("Nothing to redo"),
                _ => {}
            }
        }
    }

    // =========================================================================
    // SAVE
    // =========================================================================

    /// Mark that the secondary signer already signed in an earlier session.
    pub fn set_secondary_recorded(&mut self, recorded: bool) {
        self.secondary_recorded = recorded;
    }

    /// Check the annotation set is complete enough to submit.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::SecondarySignatureMissing`] when a second
    /// signature is required, none was recorded earlier, and nothing in the
    /// store carries the secondary tag.
    pub fn validate(&self) -> Result<(), SaveError> {
        if self.config.secondary_required
            && !self.secondary_recorded
            && !self.core.doc.has_signer(Signer::Secondary)
        {
            return Err(SaveError::SecondarySignatureMissing);
        }
        Ok(())
    }

    /// Snapshot of what a save would submit right now.
    #[must_use]
    pub fn payload(&self) -> SubmissionPayload {
        let pages = self
            .core
            .pages()
            .map(|(page, geometry)| PageMeta { page, width: geometry.width, height: geometry.height })
            .collect();
        let canvas = CanvasMeta {
            zoom: self.core.ui.zoom.factor(),
            scale: self.config.render_scale,
            rotation: self.rotation.degrees(),
            pages,
        };
        SubmissionPayload::build(&self.core.doc, canvas)
    }

    /// Validate, submit, and lock the editor on success.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if the editor is already locked, validation
    /// fails, or the sink rejects the payload. The editor stays unlocked and
    /// its contents untouched on every error path.
    pub async fn save(&mut self) -> Result<(), SaveError> {
        if self.core.is_locked() {
            self.notifier.info("This document has already been saved.");
            return Err(SaveError::Locked);
        }
        if let Err(e) = self.validate() {
            self.notifier.error("A second signature is required before saving.");
            return Err(e);
        }

        let payload = self.payload();
        match self.sink.submit(&payload).await {
            Ok(()) => {
                self.core.lock();
                info!(
                    primary_strokes = payload.primary.strokes.len(),
                    primary_images = payload.primary.images.len(),
                    secondary_strokes = payload.secondary.strokes.len(),
                    secondary_images = payload.secondary.images.len(),
                    "annotations saved; editor locked"
                );
                self.notifier.success("Saved.");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.notifier.error(format!("Save failed: {e}"));
                Err(e)
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    #[must_use]
    pub fn cache(&self) -> &RenderCache<B::Bitmap> {
        &self.cache
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.core.is_locked()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
