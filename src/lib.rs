// ============================================================================
// LIDARSCOPE - LIVE RADAR VIEW OF A ROTATING-SCAN LIDAR
// ============================================================================

// Readings arrive as `"<angle>, <distance>"` text lines. Each one is parsed,
// projected to screen-aligned Cartesian millimetres, kept in a bounded
// window, and redrawn every tick as fading trails scaled to fit a
// calibration ring.

// ============================================================================
// MODULES
// ============================================================================

pub mod composer;
pub mod config;
pub mod error;
pub mod extent;
pub mod frame_loop;
pub mod geometry;
pub mod raster;
pub mod sample;
pub mod scan_buffer;
pub mod source;
pub mod surface;
pub mod window;

pub use composer::{compose, compose_scene, Scene};
pub use config::{Theme, ViewConfig};
pub use error::{Error, Result, SurfaceError};
pub use extent::{display_scale, max_extent, DegenerateExtent};
pub use frame_loop::{FrameLoop, IngestPolicy, IngestReport, LoopState, LoopStats, TickPacer};
pub use geometry::{to_cartesian, Point};
pub use sample::{parse, ParseError, PolarSample};
pub use scan_buffer::{ScanBuffer, Snapshot};
pub use source::{ChannelSource, LineReader, LineSource};
pub use surface::{Color, DrawCommand, DrawingSurface, RecordingSurface, TextAlign};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// A lidar scope window bound to one configuration
#[derive(Debug, Clone)]
pub struct Scope {
    config: ViewConfig,
}

impl Scope {
    pub fn new(config: ViewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Build the frame loop this scope would run for `source`
    pub fn frame_loop<S: LineSource>(&self, source: S) -> FrameLoop<S> {
        FrameLoop::new(source, &self.config)
    }

    /// Open the window and plot lines from `source` until it is closed.
    pub fn show<S: LineSource>(&self, source: S) -> Result<()> {
        window::run_window(&self.config, self.frame_loop(source))
    }

    /// Plot lines from `source` onto any surface, e.g. a [`RecordingSurface`].
    ///
    /// `shutdown` is polled before every tick.
    pub fn show_on<S, D, F>(&self, source: S, surface: &mut D, shutdown: F) -> Result<()>
    where
        S: LineSource,
        D: DrawingSurface + ?Sized,
        F: FnMut() -> bool,
    {
        self.frame_loop(source)
            .run(surface, self.config.tick_period(), shutdown)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
