//! Render surfaces: the trait every drawing target implements, plus a
//! recording implementation for inspecting what was drawn.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shape drawn at the open ends of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Canvas 2D `lineCap` keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Shape drawn where two stroke pieces meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    /// Canvas 2D `lineJoin` keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// Fully resolved stroke attributes, after the tool table has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// CSS color string.
    pub color: String,
    /// Global alpha in `0.0..=1.0`.
    pub opacity: f64,
    /// Line width in pixels.
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} surface")]
    Alloc { width: u32, height: u32 },
    #[error("canvas call failed: {0}")]
    Js(String),
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Something segments can be drawn on.
///
/// Implementations must be deterministic: the same calls on a freshly
/// cleared surface of the same size produce the same result.
pub trait Surface {
    /// Draw one straight stroke from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing canvas rejects the call.
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) -> Result<(), SurfaceError>;

    /// Erase every pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing canvas rejects the call.
    fn clear(&mut self) -> Result<(), SurfaceError>;

    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Change the pixel size. Existing content is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface of that size cannot be created.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;
}

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Stroke { from: Point, to: Point, style: StrokeStyle },
    Clear,
    Resize { width: u32, height: u32 },
}

/// Surface that draws nothing and remembers every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    /// Calls recorded so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Styles of every recorded stroke, oldest first.
    pub fn strokes(&self) -> impl Iterator<Item = &StrokeStyle> {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Stroke { style, .. } => Some(style),
            SurfaceOp::Clear | SurfaceOp::Resize { .. } => None,
        })
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Surface for RecordingSurface {
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) -> Result<(), SurfaceError> {
        self.ops.push(SurfaceOp::Stroke { from, to, style: style.clone() });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.ops.push(SurfaceOp::Clear);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.width = width;
        self.height = height;
        self.ops.push(SurfaceOp::Resize { width, height });
        Ok(())
    }
}
