use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use wasm_bindgen::JsValue;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use crate::cache::{PageKey, PageRasterizer, RenderCache, Rotation};
use crate::camera::{PageGeometry, Point, Zoom, screen_to_document};
use crate::consts::ERASER_REDRAW_THROTTLE_MS;
use crate::doc::{DocStore, ImageId, Signer, Snapshot};
use crate::hit;
use crate::history::History;
use crate::input::{InputState, Key, Modifiers, PendingImage, PointerTarget, Tool, UiState};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Paint one ink segment directly, without a full page redraw.
    PaintSegment { page: u32, from: Point, to: Point, color: String, width: f64 },
    /// Redraw one page: background bitmap, then every annotation on it.
    RenderPage(u32),
    /// Redraw every page.
    RenderAll,
    /// The active tool changed.
    ToolChanged(Tool),
    SetCursor(String),
    /// A history entry was pushed or the cursor moved.
    HistoryChanged { can_undo: bool, can_redo: bool },
    NothingToUndo,
    NothingToRedo,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub doc: DocStore,
    pub history: History,
    pub ui: UiState,
    pub input: InputState,
    pages: BTreeMap<u32, PageGeometry>,
    cursor: Option<&'static str>,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Pages ---

    pub fn set_page(&mut self, page: u32, geometry: PageGeometry) {
        self.pages.insert(page, geometry);
    }

    /// Record a freshly rasterized page from its canvas pixel size.
    ///
    /// Hosts call this after every render so pointer mapping follows the
    /// current scale and rotation. Stored geometry is left alone.
    pub fn set_rendered_page(&mut self, page: u32, canvas_width: u32, canvas_height: u32, scale: f64, rotation: Rotation) {
        let geometry = PageGeometry::from_canvas(f64::from(canvas_width), f64::from(canvas_height), scale, rotation);
        self.pages.insert(page, geometry);
    }

    #[must_use]
    pub fn page(&self, page: u32) -> Option<PageGeometry> {
        self.pages.get(&page).copied()
    }

    /// Pages with a known geometry, in page order.
    pub fn pages(&self) -> impl Iterator<Item = (u32, PageGeometry)> + '_ {
        self.pages.iter().map(|(p, g)| (*p, *g))
    }

    /// Map a pointer event into document space for its page.
    #[must_use]
    pub fn map_pointer(&self, target: &PointerTarget) -> Option<Point> {
        let geometry = self.pages.get(&target.page)?;
        screen_to_document(target.client, target.rect, *geometry)
    }

    // --- Tool / settings ---

    /// Switch the active tool. Finishes any open gesture first.
    pub fn set_tool(&mut self, tool: Tool, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        self.ui.tool = tool;
        actions.push(Action::ToolChanged(tool));
        self.push_cursor(tool.cursor(), &mut actions);
        actions
    }

    /// Signer tag applied to new annotations.
    pub fn set_signer(&mut self, signer: Signer) {
        if !self.is_locked() {
            self.ui.signer = signer;
        }
    }

    pub fn set_pen_color(&mut self, color: &str) {
        if !self.is_locked() && !color.is_empty() {
            color.clone_into(&mut self.ui.pen_color);
        }
    }

    /// Non-positive or non-finite widths are ignored.
    pub fn set_pen_width(&mut self, width: f64) {
        if !self.is_locked() && width.is_finite() && width > 0.0 {
            self.ui.pen_width = width;
        }
    }

    /// Non-positive or non-finite radii are ignored.
    pub fn set_eraser_radius(&mut self, radius: f64) {
        if !self.is_locked() && radius.is_finite() && radius > 0.0 {
            self.ui.eraser_radius = radius;
        }
    }

    /// Display zoom. Allowed while locked; it never changes stored geometry.
    pub fn set_zoom(&mut self, zoom: Zoom) -> Vec<Action> {
        self.ui.zoom = zoom;
        vec![Action::RenderAll]
    }

    /// Arm image placement with a freshly picked image.
    pub fn set_pending_image(&mut self, image: PendingImage, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        if !(image.width.is_finite() && image.height.is_finite() && image.width > 0.0 && image.height > 0.0) {
            return Vec::new();
        }
        self.ui.pending_image = Some(image);
        self.set_tool(Tool::ImagePlacement, time_ms)
    }

    /// Drop the pending image and fall back to the pen if placement was armed.
    pub fn cancel_pending_image(&mut self, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        self.ui.pending_image = None;
        if self.ui.tool == Tool::ImagePlacement { self.set_tool(Tool::Pen, time_ms) } else { Vec::new() }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, target: PointerTarget, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        let Some(pt) = self.map_pointer(&target) else {
            return actions;
        };

        match self.ui.tool {
            Tool::Pen => self.begin_stroke(target.page, pt, &mut actions),
            Tool::Eraser => {
                self.input = InputState::Erasing {
                    removed_strokes: HashSet::new(),
                    removed_images: HashSet::new(),
                    dirty_pages: BTreeSet::new(),
                    touched_pages: BTreeSet::new(),
                    last_redraw_ms: None,
                };
                self.erase_at(target.page, pt, time_ms, &mut actions);
            }
            Tool::ImagePlacement => self.place_pending_image(target.page, pt, time_ms, &mut actions),
            Tool::Select => self.begin_drag(target.page, pt, &mut actions),
        }
        actions
    }

    pub fn on_pointer_move(&mut self, target: PointerTarget, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        let Some(pt) = self.map_pointer(&target) else {
            return actions;
        };

        match &self.input {
            InputState::Idle => {
                if self.ui.tool == Tool::Select {
                    let cursor = if hit::image_at(&self.doc, target.page, pt).is_some() { "move" } else { "default" };
                    self.push_cursor(cursor, &mut actions);
                }
            }
            InputState::Drawing { stroke, page, last } => {
                let (stroke, page, last) = (*stroke, *page, *last);
                if target.page != page {
                    return actions;
                }
                if self.doc.append_point(stroke, pt) {
                    if let Some(s) = self.doc.stroke(stroke) {
                        actions.push(Action::PaintSegment {
                            page,
                            from: last,
                            to: pt,
                            color: s.color.clone(),
                            width: s.stroke_width,
                        });
                    }
                    self.input = InputState::Drawing { stroke, page, last: pt };
                }
            }
            InputState::Erasing { .. } => self.erase_at(target.page, pt, time_ms, &mut actions),
            InputState::DraggingImage { id, page, grab_offset } => {
                let (id, page, grab_offset) = (*id, *page, *grab_offset);
                if target.page == page && self.doc.move_image(id, pt.x - grab_offset.x, pt.y - grab_offset.y) {
                    actions.push(Action::RenderPage(page));
                }
            }
        }
        actions
    }

    pub fn on_pointer_up(&mut self, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        self.finish_gesture(time_ms)
    }

    /// Pointer capture lost or the pointer left the page mid-gesture.
    pub fn on_pointer_cancel(&mut self, time_ms: f64) -> Vec<Action> {
        self.on_pointer_up(time_ms)
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let name = key.0.to_ascii_lowercase();
        if modifiers.command() {
            return match name.as_str() {
                "z" if modifiers.shift => self.redo(time_ms),
                "z" => self.undo(time_ms),
                "y" => self.redo(time_ms),
                _ => Vec::new(),
            };
        }
        match name.as_str() {
            "p" => self.set_tool(Tool::Pen, time_ms),
            "e" => self.set_tool(Tool::Eraser, time_ms),
            "v" => self.set_tool(Tool::Select, time_ms),
            "escape" => self.cancel_pending_image(time_ms),
            _ => Vec::new(),
        }
    }

    // --- History ---

    pub fn undo(&mut self, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        match self.history.undo() {
            Some(snapshot) => self.restore(snapshot, &mut actions),
            None => actions.push(Action::NothingToUndo),
        }
        actions
    }

    pub fn redo(&mut self, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        match self.history.redo() {
            Some(snapshot) => self.restore(snapshot, &mut actions),
            None => actions.push(Action::NothingToRedo),
        }
        actions
    }

    // --- Bulk edits ---

    /// Remove everything on one page as a single undoable action.
    pub fn clear_page(&mut self, page: u32, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        self.doc.clear_page(page);
        actions.push(Action::RenderPage(page));
        self.commit(time_ms, &mut actions);
        actions
    }

    /// Remove every annotation as a single undoable action.
    pub fn clear_all(&mut self, time_ms: f64) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture(time_ms);
        self.doc.clear_all();
        actions.push(Action::RenderAll);
        self.commit(time_ms, &mut actions);
        actions
    }

    // --- Lifecycle ---

    /// Engage the editor lock. An open gesture is discarded, not committed.
    pub fn lock(&mut self) {
        self.input = InputState::Idle;
        self.doc.lock();
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.doc.is_locked()
    }

    /// Tear down all session state, as on editor close. Open gestures are discarded.
    pub fn reset(&mut self) {
        self.doc.reset();
        self.history.reset(Snapshot::default());
        self.ui = UiState::default();
        self.input = InputState::Idle;
        self.pages.clear();
        self.cursor = None;
    }

    // --- Gesture internals ---

    fn begin_stroke(&mut self, page: u32, pt: Point, actions: &mut Vec<Action>) {
        let color = self.ui.pen_color.clone();
        let width = self.ui.pen_width;
        let Some(stroke) = self.doc.add_stroke(page, &color, width, self.ui.signer, pt) else {
            return;
        };
        self.input = InputState::Drawing { stroke, page, last: pt };
        actions.push(Action::PaintSegment { page, from: pt, to: pt, color, width });
    }

    fn erase_at(&mut self, page: u32, pt: Point, time_ms: f64, actions: &mut Vec<Action>) {
        let InputState::Erasing { removed_strokes, removed_images, dirty_pages, touched_pages, last_redraw_ms } =
            &mut self.input
        else {
            return;
        };

        let hits = hit::eraser_hits(&self.doc, page, pt, self.ui.eraser_radius, removed_strokes, removed_images);
        if !hits.is_empty() {
            let removed = self.doc.remove_strokes(&hits.strokes) + self.doc.remove_images(&hits.images);
            if removed > 0 {
                dirty_pages.insert(page);
                touched_pages.insert(page);
            }
            removed_strokes.extend(hits.strokes);
            removed_images.extend(hits.images);
        }

        let due = last_redraw_ms.is_none_or(|last| time_ms - last >= ERASER_REDRAW_THROTTLE_MS);
        if due && !dirty_pages.is_empty() {
            actions.extend(dirty_pages.iter().copied().map(Action::RenderPage));
            dirty_pages.clear();
            *last_redraw_ms = Some(time_ms);
        }
    }

    fn place_pending_image(&mut self, page: u32, pt: Point, time_ms: f64, actions: &mut Vec<Action>) {
        let Some(pending) = self.ui.pending_image.take() else {
            return;
        };
        let x = pt.x - pending.width / 2.0;
        let y = pt.y - pending.height / 2.0;
        if self.doc.add_image(page, x, y, pending.width, pending.height, &pending.image_data, self.ui.signer).is_none() {
            self.ui.pending_image = Some(pending);
            return;
        }
        actions.push(Action::RenderPage(page));
        self.ui.tool = Tool::Pen;
        actions.push(Action::ToolChanged(Tool::Pen));
        self.push_cursor(Tool::Pen.cursor(), actions);
        self.commit(time_ms, actions);
    }

    fn begin_drag(&mut self, page: u32, pt: Point, actions: &mut Vec<Action>) {
        let Some(image) = hit::image_at(&self.doc, page, pt) else {
            return;
        };
        let grab_offset = Point::new(pt.x - image.x, pt.y - image.y);
        self.input = InputState::DraggingImage { id: image.id, page, grab_offset };
        self.push_cursor("grabbing", actions);
    }

    /// Close the open gesture, if any: final redraw plus a history entry.
    fn finish_gesture(&mut self, time_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => return actions,
            InputState::Drawing { page, .. } => actions.push(Action::RenderPage(page)),
            InputState::Erasing { touched_pages, .. } => {
                actions.extend(touched_pages.into_iter().map(Action::RenderPage));
            }
            InputState::DraggingImage { page, .. } => {
                actions.push(Action::RenderPage(page));
                self.push_cursor("move", &mut actions);
            }
        }
        self.commit(time_ms, &mut actions);
        actions
    }

    fn commit(&mut self, time_ms: f64, actions: &mut Vec<Action>) {
        if self.history.snapshot(&self.doc.snapshot(), time_ms) {
            actions.push(self.history_changed());
        }
    }

    fn restore(&mut self, snapshot: Snapshot, actions: &mut Vec<Action>) {
        self.doc.restore(snapshot);
        actions.push(Action::RenderAll);
        actions.push(self.history_changed());
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    fn push_cursor(&mut self, cursor: &'static str, actions: &mut Vec<Action>) {
        if self.cursor != Some(cursor) {
            self.cursor = Some(cursor);
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser page canvases.
///
/// A browser host drives it in this order:
///
/// 1. Open the PDF in JavaScript, then call [`Engine::load_document`].
/// 2. [`Engine::attach_page`] each page canvas and [`Engine::render_page`] it
///    through a [`crate::render::JsRasterizer`].
/// 3. Forward pointer and key events. Non-drawing actions (cursor, tool and
///    history changes, empty undo/redo) are returned for the host UI.
/// 4. After [`Engine::set_render_params`], render every page again.
///
/// Fetch fallback, toasts and the save gate belong to the host.
pub struct Engine {
    pages: BTreeMap<u32, HtmlCanvasElement>,
    cache: RenderCache<HtmlCanvasElement>,
    images: HashMap<ImageId, HtmlImageElement>,
    scale: f64,
    rotation: Rotation,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine that renders pages at `scale`.
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            pages: BTreeMap::new(),
            cache: RenderCache::new(),
            images: HashMap::new(),
            scale,
            rotation: Rotation::Deg0,
            core: EngineCore::new(),
        }
    }

    // --- Document ---

    /// Forget the previous document: cached bitmaps, page canvases, annotations and history.
    pub fn load_document(&mut self) {
        self.cache.clear();
        self.pages.clear();
        self.images.clear();
        self.core.reset();
    }

    /// Bind the canvas element that displays `page`.
    pub fn attach_page(&mut self, page: u32, canvas: HtmlCanvasElement) {
        self.pages.insert(page, canvas);
    }

    /// Change the rasterization scale/rotation used for subsequent renders.
    /// Annotations are kept in document space and follow the page once it is
    /// rendered again.
    pub fn set_render_params(&mut self, scale: f64, rotation: Rotation) {
        self.scale = scale;
        self.rotation = rotation;
    }

    /// Rasterize (or fetch from cache) one page and paint it with its annotations.
    ///
    /// # Errors
    ///
    /// Returns `Err` if rasterization fails or a `Canvas2D` call fails. Other
    /// pages are unaffected; the host decides whether to report it.
    pub async fn render_page<R>(&mut self, rasterizer: &R, page: u32) -> Result<(), JsValue>
    where
        R: PageRasterizer<Bitmap = HtmlCanvasElement>,
    {
        let cached = self
            .cache
            .get_or_render(rasterizer, page, self.scale, self.rotation)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(canvas) = self.pages.get(&page) {
            canvas.set_width(cached.width);
            canvas.set_height(cached.height);
        }
        self.core.set_rendered_page(page, cached.width, cached.height, self.scale, self.rotation);
        self.redraw_page(page)
    }

    // --- Delegated input ---

    /// # Errors
    ///
    /// Returns `Err` if painting the resulting actions fails.
    pub fn on_pointer_down(&mut self, target: PointerTarget, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.on_pointer_down(target, time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if painting the resulting actions fails.
    pub fn on_pointer_move(&mut self, target: PointerTarget, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.on_pointer_move(target, time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if painting the resulting actions fails.
    pub fn on_pointer_up(&mut self, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.on_pointer_up(time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if painting the resulting actions fails.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.on_key_down(key, modifiers, time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if repainting fails.
    pub fn undo(&mut self, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.undo(time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if repainting fails.
    pub fn redo(&mut self, time_ms: f64) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.redo(time_ms);
        self.apply(&actions)?;
        Ok(actions)
    }

    // --- Render ---

    /// Paint the drawing actions; the rest are left for the host.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn apply(&mut self, actions: &[Action]) -> Result<(), JsValue> {
        for action in actions {
            match action {
                Action::PaintSegment { page, from, to, color, width } => {
                    if let (Some(canvas), Some(geometry)) = (self.pages.get(page), self.core.page(*page)) {
                        let ctx = render::context_2d(canvas)?;
                        render::draw_segment(&ctx, geometry, *from, *to, color, *width)?;
                    }
                }
                Action::RenderPage(page) => self.redraw_page(*page)?,
                Action::RenderAll => self.redraw_all()?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Repaint every attached page, e.g. after placed images finish decoding.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn redraw_all(&mut self) -> Result<(), JsValue> {
        let pages: Vec<u32> = self.pages.keys().copied().collect();
        for page in pages {
            self.redraw_page(page)?;
        }
        Ok(())
    }

    fn redraw_page(&mut self, page: u32) -> Result<(), JsValue> {
        let (Some(canvas), Some(geometry)) = (self.pages.get(&page), self.core.page(page)) else {
            return Ok(());
        };
        let ctx = render::context_2d(canvas)?;
        let background = self.cache.get(&PageKey::new(page, self.scale, self.rotation));
        render::draw_page(&ctx, background.map(|b| b.bitmap.as_ref()), geometry, &self.core.doc, page, &mut self.images)
    }

    // --- Queries ---

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.core.is_locked()
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.core.ui.tool
    }
}
