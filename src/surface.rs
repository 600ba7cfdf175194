// ============================================================================
// DRAWING SURFACE ABSTRACTION
// ============================================================================

use crate::error::SurfaceError;
use crate::geometry::Point;

/// RGBA colour, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with the alpha channel replaced (clamped to 0..=255, truncated)
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = if alpha.is_finite() {
            alpha.clamp(0.0, 255.0) as u8
        } else {
            0
        };
        Self { a, ..self }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Horizontal placement of text relative to its anchor; the anchor is always the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One retained-mode drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    /// `width == 0` fills the disc
    Circle {
        centre: Point,
        radius: f64,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        anchor: Point,
        align: TextAlign,
        color: Color,
    },
}

impl DrawCommand {
    pub fn apply<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        match self {
            DrawCommand::Clear(color) => surface.clear(*color),
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => surface.draw_line(*from, *to, *color, *width),
            DrawCommand::Circle {
                centre,
                radius,
                color,
                width,
            } => surface.draw_circle(*centre, *radius, *color, *width),
            DrawCommand::Text {
                text,
                anchor,
                align,
                color,
            } => surface.draw_text(text, *anchor, *align, *color),
        }
    }
}

/// Target the composer draws on.
///
/// Drawing calls only touch the pending frame; nothing is visible until
/// [`DrawingSurface::present`], which is also the only fallible call.
pub trait DrawingSurface {
    /// Surface dimensions in pixels (width, height)
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32);

    fn draw_circle(&mut self, centre: Point, radius: f64, color: Color, width: f32);

    fn draw_text(&mut self, text: &str, anchor: Point, align: TextAlign, color: Color);

    fn present(&mut self) -> Result<(), SurfaceError>;
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn clear(&mut self, color: Color) {
        (**self).clear(color)
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        (**self).draw_line(from, to, color, width)
    }

    fn draw_circle(&mut self, centre: Point, radius: f64, color: Color, width: f32) {
        (**self).draw_circle(centre, radius, color, width)
    }

    fn draw_text(&mut self, text: &str, anchor: Point, align: TextAlign, color: Color) {
        (**self).draw_text(text, anchor, align, color)
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        (**self).present()
    }
}

// ============================================================================
// RECORDING SURFACE
// ============================================================================

/// Surface that keeps the commands of every presented frame instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pending: Vec<DrawCommand>,
    frames: Vec<Vec<DrawCommand>>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pending: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Frames presented so far, oldest first
    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Commands drawn since the last present
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.pending.push(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.pending.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn draw_circle(&mut self, centre: Point, radius: f64, color: Color, width: f32) {
        self.pending.push(DrawCommand::Circle {
            centre,
            radius,
            color,
            width,
        });
    }

    fn draw_text(&mut self, text: &str, anchor: Point, align: TextAlign, color: Color) {
        self.pending.push(DrawCommand::Text {
            text: text.to_string(),
            anchor,
            align,
            color,
        });
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}
