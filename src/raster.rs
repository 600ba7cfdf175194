// ============================================================================
// SOFTWARE RASTERIZER
// ============================================================================

use crate::error::{Error, Result, SurfaceError};
use crate::geometry::Point;
use crate::surface::{Color, TextAlign};
use log::{info, warn};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::path::Path;

/// Font files tried in order when no label font is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Lines at or below this width take the single-pixel anti-aliased path
const THIN_LINE_WIDTH: f32 = 1.5;

pub fn load_font_file(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Font(format!("reading {}: {}", path.display(), e)))?;
    Font::try_from_vec(data).ok_or_else(|| {
        Error::Font(format!(
            "{} is not a usable TrueType/OpenType font",
            path.display()
        ))
    })
}

/// Load the label font.
///
/// An explicit path must load. Without one, well-known system fonts are tried
/// and `None` means labels will not be drawn.
pub fn load_font(path: Option<&Path>) -> Result<Option<Font<'static>>> {
    if let Some(path) = path {
        let font = load_font_file(path)?;
        info!("Loaded label font {}", path.display());
        return Ok(Some(font));
    }

    for candidate in SYSTEM_FONT_CANDIDATES {
        if let Ok(font) = load_font_file(Path::new(candidate)) {
            info!("Loaded label font {}", candidate);
            return Ok(Some(font));
        }
    }

    warn!("No system font found, distance labels disabled (use --font to pick one)");
    Ok(None)
}

/// Width in pixels of the inked area of `text`
pub fn text_width(text: &str, font: &Font, scale: Scale) -> i32 {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
            (min_x.min(bb.min.x), max_x.max(bb.max.x))
        });
    if min_x < max_x {
        max_x - min_x
    } else {
        0
    }
}

/// Borrowed RGBA8 frame with drawing primitives.
///
/// Every primitive clips to the frame, so callers may pass geometry that is
/// partly or entirely off-screen.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    font: Option<&'a Font<'static>>,
    font_scale: Scale,
}

impl<'a> Canvas<'a> {
    pub fn new(
        frame: &'a mut [u8],
        width: usize,
        height: usize,
    ) -> std::result::Result<Self, SurfaceError> {
        let expected = width * height * 4;
        if frame.len() != expected {
            return Err(SurfaceError::FrameSize {
                expected,
                actual: frame.len(),
            });
        }
        Ok(Self {
            frame,
            width,
            height,
            font: None,
            font_scale: Scale::uniform(18.0),
        })
    }

    pub fn with_font(mut self, font: Option<&'a Font<'static>>, size: f32) -> Self {
        self.font = font;
        self.font_scale = Scale::uniform(size);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// RGBA at (x, y), or `None` outside the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.frame[idx..idx + 4]);
        Some(out)
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Blend `color` over (x, y) with `coverage` scaling the colour's own alpha.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (channel, value) in src.iter().enumerate() {
            let dst = self.frame[idx + channel] as f32;
            self.frame[idx + channel] = (value * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return;
        }
        if width <= THIN_LINE_WIDTH {
            self.draw_thin_line_aa(from, to, color);
        } else {
            self.draw_thick_line_aa(from, to, color, width);
        }
    }

    /// Xiaolin Wu style line: two pixels per step along the major axis
    fn draw_thin_line_aa(&mut self, from: Point, to: Point, color: Color) {
        let steep = (to.y - from.y).abs() > (to.x - from.x).abs();
        let (mut x0, mut y0, mut x1, mut y1) = if steep {
            (from.y, from.x, to.y, to.x)
        } else {
            (from.x, from.y, to.x, to.y)
        };
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let gradient = if dx.abs() < f64::EPSILON {
            0.0
        } else {
            (y1 - y0) / dx
        };

        // Only walk the part of the major axis that can land on the frame
        let major_limit = if steep { self.height } else { self.width } as f64;
        let start = x0.round().max(-1.0);
        let end = x1.round().min(major_limit);
        if start > end {
            return;
        }

        let mut y = y0 + gradient * (start - x0);
        let mut x = start;
        while x <= end {
            let fy = y.floor();
            let frac = (y - fy) as f32;
            let (major, minor) = (x as i64, fy as i64);
            if steep {
                self.blend_pixel(minor, major, color, 1.0 - frac);
                self.blend_pixel(minor.saturating_add(1), major, color, frac);
            } else {
                self.blend_pixel(major, minor, color, 1.0 - frac);
                self.blend_pixel(major, minor.saturating_add(1), color, frac);
            }
            y += gradient;
            x += 1.0;
        }
    }

    /// Distance-to-segment coverage over the clipped bounding box
    fn draw_thick_line_aa(&mut self, from: Point, to: Point, color: Color, width: f32) {
        let pad = width.ceil() as f64 + 1.0;
        let min_x = (from.x.min(to.x) - pad).floor().max(0.0) as i64;
        let max_x = (from.x.max(to.x) + pad).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = (from.y.min(to.y) - pad).floor().max(0.0) as i64;
        let max_y = (from.y.max(to.y) + pad).ceil().min(self.height as f64 - 1.0) as i64;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len_sq = dx * dx + dy * dy;
        let half = width as f64 / 2.0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f64 - from.x;
                let py = y as f64 - from.y;
                let t = if len_sq > 0.0 {
                    ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let lx = from.x + t * dx;
                let ly = from.y + t * dy;
                let dist = ((lx - x as f64).powi(2) + (ly - y as f64).powi(2)).sqrt();
                let aa = (1.0 - (dist - half).clamp(0.0, 1.0)) as f32;
                if aa > 0.01 {
                    self.blend_pixel(x, y, color, aa);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, centre: Point, radius: f64, color: Color) {
        self.circle_coverage(centre, radius + 1.0, color, |dist| {
            (radius + 0.5 - dist).clamp(0.0, 1.0)
        });
    }

    pub fn stroke_circle(&mut self, centre: Point, radius: f64, color: Color, width: f32) {
        let half = (width as f64 / 2.0).max(0.5);
        self.circle_coverage(centre, radius + half + 1.0, color, |dist| {
            (half + 0.5 - (dist - radius).abs()).clamp(0.0, 1.0)
        });
    }

    fn circle_coverage<F>(&mut self, centre: Point, reach: f64, color: Color, coverage: F)
    where
        F: Fn(f64) -> f64,
    {
        if !(centre.x.is_finite() && centre.y.is_finite() && reach.is_finite()) || reach < 0.0 {
            return;
        }
        let min_x = (centre.x - reach).floor().max(0.0) as i64;
        let max_x = (centre.x + reach).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = (centre.y - reach).floor().max(0.0) as i64;
        let max_y = (centre.y + reach).ceil().min(self.height as f64 - 1.0) as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dist = ((x as f64 - centre.x).powi(2) + (y as f64 - centre.y).powi(2)).sqrt();
                let aa = coverage(dist) as f32;
                if aa > 0.0 {
                    self.blend_pixel(x, y, color, aa);
                }
            }
        }
    }

    /// Draw `text` with its top edge at `anchor.y`. No-op without a font.
    pub fn draw_text(&mut self, text: &str, anchor: Point, align: TextAlign, color: Color) {
        let Some(font) = self.font else {
            return;
        };
        let scale = self.font_scale;
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let (min_x, min_y) = glyphs
            .iter()
            .filter_map(|g| g.pixel_bounding_box())
            .fold((i32::MAX, i32::MAX), |(min_x, min_y), bb| {
                (min_x.min(bb.min.x), min_y.min(bb.min.y))
            });
        if min_x == i32::MAX {
            return;
        }
        let width_px = text_width(text, font, scale);
        let left = match align {
            TextAlign::Left => anchor.x,
            TextAlign::Center => anchor.x - width_px as f64 / 2.0,
            TextAlign::Right => anchor.x - width_px as f64,
        }
        .round() as i64;
        let top = anchor.y.round() as i64;

        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = left + (gx as i32 + bb.min.x - min_x) as i64;
                    let py = top + (gy as i32 + bb.min.y - min_y) as i64;
                    self.blend_pixel(px, py, color, v);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(0xff, 0x00, 0x00);

    fn frame(width: usize, height: usize) -> Vec<u8> {
        vec![0; width * height * 4]
    }

    #[test]
    fn rejects_mismatched_frame() {
        let mut buf = vec![0; 10];
        assert!(matches!(
            Canvas::new(&mut buf, 4, 4),
            Err(SurfaceError::FrameSize {
                expected: 64,
                actual: 10
            })
        ));
    }

    #[test]
    fn clear_fills_every_pixel_opaque() {
        let mut buf = frame(3, 2);
        let mut canvas = Canvas::new(&mut buf, 3, 2).unwrap();
        canvas.clear(Color::rgb(1, 2, 3));
        assert!(buf.chunks_exact(4).all(|px| px == [1, 2, 3, 0xff]));
    }

    #[test]
    fn blend_respects_colour_alpha() {
        let mut buf = frame(2, 2);
        let mut canvas = Canvas::new(&mut buf, 2, 2).unwrap();
        canvas.clear(Color::BLACK);
        canvas.blend_pixel(0, 0, Color::WHITE, 1.0);
        canvas.blend_pixel(1, 0, Color::WHITE.with_alpha(0.0), 1.0);
        canvas.blend_pixel(0, 1, Color::WHITE.with_alpha(255.0), 0.5);
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 1), Some([128, 128, 128, 255]));
        assert_eq!(canvas.pixel(2, 0), None);
    }

    #[test]
    fn out_of_bounds_drawing_is_clipped() {
        let mut buf = frame(8, 8);
        let mut canvas = Canvas::new(&mut buf, 8, 8).unwrap();
        canvas.blend_pixel(-1, 3, RED, 1.0);
        canvas.blend_pixel(3, 100, RED, 1.0);
        canvas.draw_line(Point::new(-50.0, -50.0), Point::new(500.0, 300.0), RED, 1.0);
        canvas.draw_line(Point::new(-50.0, 4.0), Point::new(500.0, 4.0), RED, 3.0);
        canvas.fill_circle(Point::new(-20.0, -20.0), 5.0, RED);
        canvas.stroke_circle(Point::new(4.0, 4.0), 1000.0, RED, 1.0);
        canvas.draw_line(Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0), RED, 1.0);
    }

    #[test]
    fn lines_at_extreme_coordinates_are_dropped() {
        let mut buf = frame(8, 8);
        let mut canvas = Canvas::new(&mut buf, 8, 8).unwrap();
        canvas.clear(Color::BLACK);
        canvas.draw_line(Point::new(0.0, 1e300), Point::new(6.0, 1e300), RED, 1.0);
        canvas.draw_line(Point::new(1e300, 0.0), Point::new(1e300, 6.0), RED, 1.0);
        canvas.draw_line(Point::new(0.0, -1e300), Point::new(6.0, -1e300), RED, 1.0);
        assert!(buf.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn horizontal_line_covers_its_row() {
        let mut buf = frame(10, 5);
        let mut canvas = Canvas::new(&mut buf, 10, 5).unwrap();
        canvas.clear(Color::BLACK);
        canvas.draw_line(Point::new(1.0, 2.0), Point::new(8.0, 2.0), RED, 1.0);
        for x in 1..=8 {
            assert_eq!(canvas.pixel(x, 2), Some([255, 0, 0, 255]), "x = {x}");
        }
        assert_eq!(canvas.pixel(0, 2), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(9, 2), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(4, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn steep_line_covers_its_column() {
        let mut buf = frame(5, 10);
        let mut canvas = Canvas::new(&mut buf, 5, 10).unwrap();
        canvas.clear(Color::BLACK);
        canvas.draw_line(Point::new(3.0, 9.0), Point::new(3.0, 0.0), RED, 1.0);
        for y in 0..10 {
            assert_eq!(canvas.pixel(3, y), Some([255, 0, 0, 255]), "y = {y}");
        }
    }

    #[test]
    fn thick_line_is_wider_than_thin_line() {
        let mut buf = frame(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20).unwrap();
        canvas.clear(Color::BLACK);
        canvas.draw_line(Point::new(2.0, 10.0), Point::new(17.0, 10.0), RED, 4.0);
        assert_eq!(canvas.pixel(10, 9), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(10, 11), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(10, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn filled_dot_is_centred() {
        let mut buf = frame(9, 9);
        let mut canvas = Canvas::new(&mut buf, 9, 9).unwrap();
        canvas.clear(Color::BLACK);
        canvas.fill_circle(Point::new(4.0, 4.0), 1.0, RED);
        assert_eq!(canvas.pixel(4, 4), Some([255, 0, 0, 255]));
        // Edge pixels are partially covered
        let edge = canvas.pixel(5, 4).unwrap();
        assert!(edge[0] >= 127 && edge[0] < 255);
        assert_eq!(canvas.pixel(8, 8), Some([0, 0, 0, 255]));
    }

    #[test]
    fn ring_is_hollow() {
        let mut buf = frame(41, 41);
        let mut canvas = Canvas::new(&mut buf, 41, 41).unwrap();
        canvas.clear(Color::BLACK);
        canvas.stroke_circle(Point::new(20.0, 20.0), 15.0, Color::WHITE, 1.0);
        assert_eq!(canvas.pixel(35, 20), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(20, 5), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(20, 20), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn text_without_font_draws_nothing() {
        let mut buf = frame(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20).unwrap();
        canvas.clear(Color::BLACK);
        canvas.draw_text("123 mm", Point::new(19.0, 0.0), TextAlign::Right, Color::WHITE);
        assert!(buf.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn explicit_missing_font_is_an_error() {
        let result = load_font(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(Error::Font(_))));
    }
}
