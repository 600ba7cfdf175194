use crate::surface::Color;
use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// Tick rate used when the configured one is not a positive finite number
pub const DEFAULT_TICK_RATE: f64 = 20.0;

/// Raw lines allowed per tick, as a multiple of the valid-point quota
pub const LINES_PER_POINT_BUDGET: usize = 4;

/// Colours and sizes for the radar plot
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub trail_color: Color,
    pub dot_color: Color,
    pub ring_color: Color,
    pub label_color: Color,
    /// Opacity of the newest point; the oldest fades to zero
    pub max_alpha: f64,
    /// Trail lines are this fraction of their dot's opacity
    pub trail_alpha_factor: f64,
    pub dot_radius: f64,
    pub line_width: f32,
    pub font_size: f32,
    /// Gap between the label's right edge and the ring
    pub label_padding: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            trail_color: Color::rgb(0x00, 0x00, 0xff),
            dot_color: Color::rgb(0x00, 0x64, 0xff),
            ring_color: Color::WHITE,
            label_color: Color::WHITE,
            max_alpha: 255.0,
            trail_alpha_factor: 0.1,
            dot_radius: 1.0,
            line_width: 1.0,
            font_size: 18.0,
            label_padding: 10.0,
        }
    }
}

/// Start-up configuration, fixed for the lifetime of the process
#[derive(Debug, Clone, Builder)]
pub struct ViewConfig {
    #[builder(default = "Lidar Visualisation".to_string())]
    pub title: String,

    /// Window side in logical pixels; derived from the display when unset
    pub surface_size: Option<u32>,
    #[builder(default = 80)]
    pub display_margin: u32,

    /// Scan buffer capacity
    #[builder(default = 1000)]
    pub point_history: usize,

    // Frame loop
    #[builder(default = DEFAULT_TICK_RATE)]
    pub tick_rate: f64,
    #[builder(default = 250)]
    pub points_per_tick: usize,
    pub max_lines_per_tick: Option<usize>,

    pub font_path: Option<PathBuf>,
    #[builder(default)]
    pub theme: Theme,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ViewConfig {
    pub fn tick_period(&self) -> Duration {
        let rate = if self.tick_rate.is_finite() && self.tick_rate > 0.0 {
            self.tick_rate
        } else {
            DEFAULT_TICK_RATE
        };
        Duration::from_secs_f64(1.0 / rate)
    }

    /// Valid points to accept per tick (at least one)
    pub fn point_quota(&self) -> usize {
        self.points_per_tick.max(1)
    }

    /// Raw lines to read per tick before giving up on the quota
    pub fn line_budget(&self) -> usize {
        self.max_lines_per_tick
            .unwrap_or_else(|| self.point_quota().saturating_mul(LINES_PER_POINT_BUDGET))
            .max(self.point_quota())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_viewer() {
        let config = ViewConfig::default();
        assert_eq!(config.point_history, 1000);
        assert_eq!(config.points_per_tick, 250);
        assert_eq!(config.display_margin, 80);
        assert_eq!(config.surface_size, None);
        assert_eq!(config.tick_period(), Duration::from_millis(50));
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn builder_overrides() {
        let config = ViewConfig::builder()
            .point_history(42)
            .surface_size(600)
            .tick_rate(10.0)
            .title("bench".to_string())
            .build();
        assert_eq!(config.point_history, 42);
        assert_eq!(config.surface_size, Some(600));
        assert_eq!(config.tick_period(), Duration::from_millis(100));
        assert_eq!(config.title, "bench");
    }

    #[test]
    fn invalid_tick_rate_falls_back() {
        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = ViewConfig::builder().tick_rate(rate).build();
            assert_eq!(config.tick_period(), Duration::from_millis(50));
        }
    }

    #[test]
    fn line_budget_defaults_to_multiple_of_quota() {
        let config = ViewConfig::builder().points_per_tick(10).build();
        assert_eq!(config.line_budget(), 40);

        let config = ViewConfig::builder()
            .points_per_tick(10)
            .max_lines_per_tick(3)
            .build();
        // Never below the quota itself
        assert_eq!(config.line_budget(), 10);

        let config = ViewConfig::builder().points_per_tick(0).build();
        assert_eq!(config.point_quota(), 1);
    }
}
