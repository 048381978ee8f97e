//! Software bitmap surface backed by tiny-skia.
//!
//! Used wherever there is no browser canvas: the CLI watcher writes its
//! contents to PNG, and tests read pixels back to check what the render
//! function produced. Colors are parsed from CSS hex notation only; a
//! stroke whose color cannot be parsed is skipped.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::surface::{LineCap, LineJoin, Point, StrokeStyle, Surface, SurfaceError};

/// In-memory RGBA surface.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Alloc`] when either dimension is zero or the
    /// total size overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        Ok(Self { pixmap: allocate(width, height)? })
    }

    /// Straight (non-premultiplied) RGBA at `(x, y)`, or `None` out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.pixmap.width() || y >= self.pixmap.height() {
            return None;
        }
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// True when no pixel has been touched since the last clear.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|&b| b == 0)
    }

    /// Premultiplied RGBA bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Encode the current contents as a PNG file.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Encode`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        self.pixmap.encode_png().map_err(|e| SurfaceError::Encode(e.to_string()))
    }
}

impl Surface for RasterSurface {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) -> Result<(), SurfaceError> {
        let Some(color) = parse_hex_color(&style.color) else {
            log::debug!("raster: unsupported color {:?}; stroke skipped", style.color);
            return Ok(());
        };

        let mut color = color;
        color.apply_opacity(to_f32(style.opacity.clamp(0.0, 1.0)));
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(color);

        let (w, h) = self.size();
        let diagonal = f64::from(w).hypot(f64::from(h));
        let width = style.width.min(diagonal * 2.0);
        let Some((from, to)) = clip_to_box(from, to, -width, f64::from(w) + width, -width, f64::from(h) + width) else {
            return Ok(());
        };

        let stroke = Stroke {
            width: to_f32(width),
            line_cap: skia_cap(style.cap),
            line_join: skia_join(style.join),
            ..Stroke::default()
        };

        let mut pb = PathBuilder::new();
        pb.move_to(to_f32(from.x), to_f32(from.y));
        pb.line_to(to_f32(to.x), to_f32(to.y));
        if let Some(path) = pb.finish() {
            self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.pixmap.fill(Color::TRANSPARENT);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.pixmap = allocate(width, height)?;
        Ok(())
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap, SurfaceError> {
    Pixmap::new(width, height).ok_or(SurfaceError::Alloc { width, height })
}

/// Liang-Barsky clip of `from..to` against an axis-aligned box. Keeps huge
/// coordinates out of the rasterizer, which rejects them silently.
fn clip_to_box(from: Point, to: Point, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Option<(Point, Point)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let edges = [
        (-dx, from.x - x_min),
        (dx, x_max - from.x),
        (-dy, from.y - y_min),
        (dy, y_max - from.y),
    ];

    let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
    for (step, room) in edges {
        if step.abs() <= f64::EPSILON {
            if room < 0.0 {
                return None;
            }
        } else if step < 0.0 {
            enter = enter.max(room / step);
        } else {
            exit = exit.min(room / step);
        }
    }
    if enter > exit {
        return None;
    }

    let at = |frac: f64| Point::new(from.x + dx * frac, from.y + dy * frac);
    Some((at(enter), at(exit)))
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(v: f64) -> f32 {
    v as f32
}

fn skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn skia_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
pub(crate) fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        match u8::from_str_radix(s, 16) {
            Ok(v) => Some(v),
            Err(_) => None,
        }
    };
    let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
    let long = |i: usize| channel(&hex[i * 2..i * 2 + 2]);

    let [r, g, b, a] = match hex.len() {
        3 => [short(0)?, short(1)?, short(2)?, 255],
        4 => [short(0)?, short(1)?, short(2)?, short(3)?],
        6 => [long(0)?, long(1)?, long(2)?, 255],
        8 => [long(0)?, long(1)?, long(2)?, long(3)?],
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, a))
}
