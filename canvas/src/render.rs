//! Rendering: paints page backgrounds and annotations to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the annotation store and produces pixels.
//! It does not mutate any application state beyond its image-element cache.
//!
//! It also hosts [`JsRasterizer`], the bridge to the JavaScript PDF renderer.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::cache::{PageRasterizer, RasterError, RasterPage, Rotation};
use crate::camera::{PageGeometry, Point};
use crate::doc::{DocStore, ImageId, PlacedImage, Stroke};

/// Fetch the 2D context of a page canvas.
///
/// # Errors
///
/// Returns `Err` if the canvas has no 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Draw a full page: background bitmap, then strokes, then images.
///
/// The background is blitted in canvas space; annotations are painted in
/// document space through the page transform.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_page(
    ctx: &CanvasRenderingContext2d,
    background: Option<&HtmlCanvasElement>,
    geometry: PageGeometry,
    doc: &DocStore,
    page: u32,
    images: &mut HashMap<ImageId, HtmlImageElement>,
) -> Result<(), JsValue> {
    let (width, height) = geometry.canvas_size();
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    if let Some(bitmap) = background {
        ctx.draw_image_with_html_canvas_element(bitmap, 0.0, 0.0)?;
    }

    ctx.save();
    let painted = set_page_transform(ctx, geometry).and_then(|()| {
        for stroke in doc.strokes_on_page(page) {
            draw_stroke(ctx, stroke);
        }
        doc.images_on_page(page).try_for_each(|image| draw_image(ctx, image, images))
    });
    ctx.restore();
    painted
}

/// Paint one document-space ink segment on top of whatever is already on the canvas.
///
/// # Errors
///
/// Returns `Err` if the page transform cannot be applied.
pub fn draw_segment(
    ctx: &CanvasRenderingContext2d,
    geometry: PageGeometry,
    from: Point,
    to: Point,
    color: &str,
    width: f64,
) -> Result<(), JsValue> {
    ctx.save();
    let applied = set_page_transform(ctx, geometry);
    if applied.is_ok() {
        set_ink(ctx, color, width);
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
    }
    ctx.restore();
    applied
}

fn set_page_transform(ctx: &CanvasRenderingContext2d, geometry: PageGeometry) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = geometry.transform();
    ctx.set_transform(a, b, c, d, e, f)
}

fn draw_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
    let Some((first, rest)) = stroke.path.split_first() else {
        return;
    };
    ctx.save();
    set_ink(ctx, &stroke.color, stroke.stroke_width);
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    if rest.is_empty() {
        // Single tap: a zero-length segment with round caps renders as a dot.
        ctx.line_to(first.x, first.y);
    }
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();
    ctx.restore();
}

fn draw_image(
    ctx: &CanvasRenderingContext2d,
    image: &PlacedImage,
    elements: &mut HashMap<ImageId, HtmlImageElement>,
) -> Result<(), JsValue> {
    let element = match elements.entry(image.id) {
        Entry::Occupied(slot) => slot.into_mut(),
        Entry::Vacant(slot) => {
            let el = HtmlImageElement::new()?;
            el.set_src(&image.image_data);
            slot.insert(el)
        }
    };
    // Still decoding; the host repaints once the element loads.
    if !element.complete() {
        return Ok(());
    }
    ctx.draw_image_with_html_image_element_and_dw_and_dh(element, image.x, image.y, image.width, image.height)
}

fn set_ink(ctx: &CanvasRenderingContext2d, color: &str, width: f64) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
}

// =============================================================
// Rasterizer bridge
// =============================================================

/// Rasterizer backed by a JavaScript function
/// `(page, scale, rotation) => Promise<HTMLCanvasElement>`, typically a thin
/// wrapper around pdf.js `page.render`.
pub struct JsRasterizer {
    render_fn: js_sys::Function,
}

impl JsRasterizer {
    #[must_use]
    pub fn new(render_fn: js_sys::Function) -> Self {
        Self { render_fn }
    }
}

impl PageRasterizer for JsRasterizer {
    type Bitmap = HtmlCanvasElement;

    async fn rasterize(
        &self,
        page: u32,
        scale: f64,
        rotation: Rotation,
    ) -> Result<RasterPage<HtmlCanvasElement>, RasterError> {
        let returned = self
            .render_fn
            .call3(&JsValue::NULL, &JsValue::from(page), &JsValue::from(scale), &JsValue::from(rotation.degrees()))
            .map_err(js_error)?;
        let value = JsFuture::from(js_sys::Promise::resolve(&returned)).await.map_err(js_error)?;
        let canvas = value.dyn_into::<HtmlCanvasElement>().map_err(js_error)?;
        Ok(RasterPage { width: canvas.width(), height: canvas.height(), bitmap: canvas })
    }
}

fn js_error(value: JsValue) -> RasterError {
    RasterError(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
