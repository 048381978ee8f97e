//! Browser canvas surface and DOM event extraction.
//!
//! Everything that reads from `web_sys` types lives here, so the rest of the
//! crate only sees [`Point`]s and [`PointerSample`]s.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

use crate::input::PointerSample;
use crate::surface::{Point, StrokeStyle, Surface, SurfaceError};

/// A `<canvas>` element and its 2D context.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Bind to `canvas`, acquiring its 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Js`] if the element has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| SurfaceError::Js("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Js("2d context has an unexpected type".into()))?;
        Ok(Self { canvas, ctx })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for Canvas2dSurface {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) -> Result<(), SurfaceError> {
        let ctx = &self.ctx;
        ctx.set_line_cap(style.cap.as_css());
        ctx.set_line_join(style.join.as_css());
        ctx.set_global_alpha(style.opacity);
        ctx.set_stroke_style_str(&style.color);
        ctx.set_line_width(style.width);

        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }
}

// =============================================================
// Event extraction
// =============================================================

/// Mouse position as the event's canvas-relative offset.
#[must_use]
pub fn mouse_sample(ev: &MouseEvent) -> PointerSample {
    PointerSample::mouse(f64::from(ev.offset_x()), f64::from(ev.offset_y()))
}

/// Active touches in client coordinates plus the canvas's bounding-box
/// origin.
#[must_use]
pub fn touch_sample(ev: &TouchEvent, canvas: &HtmlCanvasElement) -> PointerSample {
    let list = ev.touches();
    let touches = (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Point::new(f64::from(t.client_x()), f64::from(t.client_y())))
        .collect();
    let rect = canvas.get_bounding_client_rect();
    PointerSample::Touch {
        touches,
        canvas_origin: Point::new(rect.left(), rect.top()),
    }
}

/// Wrap a thrown JS value.
pub fn js_err(v: JsValue) -> SurfaceError {
    SurfaceError::Js(v.as_string().unwrap_or_else(|| format!("{v:?}")))
}
