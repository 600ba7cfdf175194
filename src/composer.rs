// ============================================================================
// RENDER COMPOSER
// ============================================================================

use crate::config::Theme;
use crate::error::SurfaceError;
use crate::extent::{display_scale, max_extent};
use crate::geometry::Point;
use crate::scan_buffer::Snapshot;
use crate::surface::{DrawCommand, DrawingSurface, TextAlign};

/// One composed frame: the draw commands plus the geometry they were derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    /// `None` when there were no points
    pub extent: Option<f64>,
    /// Pixels per millimetre
    pub scale: f64,
    /// Radius of the calibration ring, `None` when no ring was drawn
    pub ring_radius: Option<f64>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
            extent: None,
            scale: 0.0,
            ring_radius: None,
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Replay onto a surface and present it once
    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        for command in &self.commands {
            command.apply(surface);
        }
        surface.present()
    }
}

/// Opacity of the point at `index` (0 = oldest) in a window of `count` points.
///
/// Linear from 0 for the oldest to `max_alpha` for the newest; a lone point is fully opaque.
pub fn fade_alpha(index: usize, count: usize, max_alpha: f64) -> f64 {
    if count <= 1 {
        return max_alpha;
    }
    let alpha_step = max_alpha / (count - 1) as f64;
    alpha_step * index as f64
}

/// Label text for the ring, rounded to whole millimetres
pub fn distance_label(extent: f64) -> String {
    format!("{} mm", extent.round() as i64)
}

/// Build the frame for `points` around `centre` on a surface whose shorter side is `size`.
pub fn compose_scene(centre: Point, points: Snapshot<'_>, size: u32, theme: &Theme) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(theme.background));

    let extent = max_extent(points).ok();
    let scale = display_scale(size, extent.unwrap_or(0.0));
    scene.extent = extent;
    scene.scale = scale;

    // Fading trails, oldest first so newer points land on top
    let count = points.len();
    for (index, point) in points.iter().enumerate() {
        let alpha = fade_alpha(index, count, theme.max_alpha);
        let end = centre + *point * scale;
        scene.add_command(DrawCommand::Line {
            from: centre,
            to: end,
            color: theme.trail_color.with_alpha(alpha * theme.trail_alpha_factor),
            width: theme.line_width,
        });
        scene.add_command(DrawCommand::Circle {
            centre: end,
            radius: theme.dot_radius,
            color: theme.dot_color.with_alpha(alpha),
            width: 0.0,
        });
    }

    let Some(extent) = extent else {
        return scene;
    };

    // Calibration ring with a radial tick along +X
    let radius = extent * scale;
    scene.ring_radius = Some(radius);
    scene.add_command(DrawCommand::Circle {
        centre,
        radius,
        color: theme.ring_color,
        width: theme.line_width,
    });
    scene.add_command(DrawCommand::Line {
        from: centre,
        to: Point::new(centre.x + radius, centre.y),
        color: theme.ring_color,
        width: theme.line_width,
    });

    scene.add_command(DrawCommand::Text {
        text: distance_label(extent),
        anchor: Point::new(centre.x + radius - theme.label_padding, centre.y),
        align: TextAlign::Right,
        color: theme.label_color,
    });

    scene
}

/// Compose `points` and present the result on `surface`.
pub fn compose<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    centre: Point,
    points: Snapshot<'_>,
    size: u32,
    theme: &Theme,
) -> Result<(), SurfaceError> {
    compose_scene(centre, points, size, theme).render(surface)
}
