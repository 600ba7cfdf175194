// ============================================================================
// WINDOWED SURFACE (winit + pixels)
// ============================================================================

use crate::config::ViewConfig;
use crate::error::{Result, SurfaceError};
use crate::frame_loop::{FrameLoop, LoopState, TickPacer};
use crate::geometry::Point;
use crate::raster::{load_font, Canvas};
use crate::source::LineSource;
use crate::surface::{Color, DrawingSurface, TextAlign};
use log::{debug, error, info};
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

/// Window side used when no monitor size is available
const FALLBACK_SURFACE_SIZE: u32 = 720;

/// Smallest window side derived from the display
const MIN_SURFACE_SIZE: u32 = 200;

/// Dimensions, font and pending failure of the frame a [`PixelsSurface`] draws into
struct FrameState {
    width: u32,
    height: u32,
    font: Option<Font<'static>>,
    font_size: f32,
    fault: Option<SurfaceError>,
}

impl FrameState {
    /// Run `draw` on a canvas over `frame`. A mismatched frame is kept as a
    /// fault and reported by the next present.
    fn draw<F: FnOnce(&mut Canvas)>(&mut self, frame: &mut [u8], draw: F) {
        if self.fault.is_some() {
            return;
        }
        match Canvas::new(frame, self.width as usize, self.height as usize) {
            Ok(canvas) => draw(&mut canvas.with_font(self.font.as_ref(), self.font_size)),
            Err(e) => self.fault = Some(e),
        }
    }

    fn take_fault(&mut self) -> std::result::Result<(), SurfaceError> {
        self.fault.take().map_or(Ok(()), Err)
    }
}

/// Drawing surface backed by a `pixels` frame inside a window.
pub struct PixelsSurface<'win> {
    pixels: Pixels<'win>,
    frame: FrameState,
}

impl<'win> PixelsSurface<'win> {
    pub fn new(
        pixels: Pixels<'win>,
        size: PhysicalSize<u32>,
        font: Option<Font<'static>>,
        font_size: f32,
    ) -> Self {
        Self {
            pixels,
            frame: FrameState {
                width: size.width,
                height: size.height,
                font,
                font_size,
                fault: None,
            },
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) -> std::result::Result<(), SurfaceError> {
        if size.width == 0 || size.height == 0 {
            // Minimised; keep the old buffer until a real size arrives
            return Ok(());
        }
        self.pixels.resize_buffer(size.width, size.height)?;
        self.pixels.resize_surface(size.width, size.height)?;
        self.frame.width = size.width;
        self.frame.height = size.height;
        Ok(())
    }

    fn with_canvas<F: FnOnce(&mut Canvas)>(&mut self, draw: F) {
        self.frame.draw(self.pixels.frame_mut(), draw);
    }
}

impl DrawingSurface for PixelsSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn clear(&mut self, color: Color) {
        self.with_canvas(|canvas| canvas.clear(color));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.with_canvas(|canvas| canvas.draw_line(from, to, color, width));
    }

    fn draw_circle(&mut self, centre: Point, radius: f64, color: Color, width: f32) {
        self.with_canvas(|canvas| {
            if width <= 0.0 {
                canvas.fill_circle(centre, radius, color);
            } else {
                canvas.stroke_circle(centre, radius, color, width);
            }
        });
    }

    fn draw_text(&mut self, text: &str, anchor: Point, align: TextAlign, color: Color) {
        self.with_canvas(|canvas| canvas.draw_text(text, anchor, align, color));
    }

    fn present(&mut self) -> std::result::Result<(), SurfaceError> {
        self.frame.take_fault()?;
        self.pixels.render()?;
        Ok(())
    }
}

fn is_quit_key(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed && is_quit(&event.logical_key, event.physical_key)
}

/// The `Q` key position, or a `q` of either case from the active layout
fn is_quit(logical: &Key, physical: PhysicalKey) -> bool {
    physical == PhysicalKey::Code(KeyCode::KeyQ)
        || matches!(logical.as_ref(), Key::Character(c) if c.eq_ignore_ascii_case("q"))
}

/// Side of the square window: configured, or the shorter display side minus the margin.
fn surface_side(event_loop: &EventLoop<()>, config: &ViewConfig) -> u32 {
    if let Some(size) = config.surface_size {
        return size.max(1);
    }
    match event_loop.primary_monitor() {
        Some(monitor) => {
            let logical: LogicalSize<u32> = monitor.size().to_logical(monitor.scale_factor());
            logical
                .width
                .min(logical.height)
                .saturating_sub(config.display_margin)
                .max(MIN_SURFACE_SIZE)
        }
        None => FALLBACK_SURFACE_SIZE,
    }
}

/// Open the window and drive `frame_loop` until the window closes, `q` is
/// pressed, or a fatal error occurs.
pub fn run_window<S: LineSource>(config: &ViewConfig, mut frame_loop: FrameLoop<S>) -> Result<()> {
    let font = load_font(config.font_path.as_deref())?;

    let event_loop = EventLoop::new()?;
    let side = surface_side(&event_loop, config);
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(side as f64, side as f64))
        .with_resizable(false)
        .build(&event_loop)?;
    let window = std::sync::Arc::new(window);
    info!("Opened {}x{} window", side, side);

    let size = window.inner_size();
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let pixels = Pixels::new(size.width, size.height, surface_texture)?;
    let mut surface = PixelsSurface::new(pixels, size, font, config.theme.font_size);

    let window_clone = window.clone();
    let mut pacer = TickPacer::new(config.tick_period());
    let mut outcome: Result<()> = Ok(());

    event_loop.run(|event, window_target| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                frame_loop.request_stop();
                window_clone.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } if is_quit_key(&event) => {
                frame_loop.request_stop();
                window_clone.request_redraw();
            }
            WindowEvent::Resized(new_size) => {
                if let Err(e) = surface.resize(new_size) {
                    error!("Resize failed: {}", e);
                    outcome = Err(e.into());
                    window_target.exit();
                }
            }
            WindowEvent::RedrawRequested => match frame_loop.tick(&mut surface) {
                Ok(LoopState::Running) => {}
                Ok(LoopState::Stopped) => {
                    let stats = frame_loop.stats();
                    info!(
                        "Stopped after {} frames ({} points, {} rejected lines)",
                        stats.frames, stats.accepted, stats.rejected
                    );
                    window_target.exit();
                }
                Err(e) => {
                    error!("Frame loop failed: {}", e);
                    outcome = Err(e);
                    window_target.exit();
                }
            },
            _ => {}
        },
        Event::AboutToWait => {
            if pacer.is_due() {
                pacer.mark();
                window_clone.request_redraw();
            }
            window_target.set_control_flow(ControlFlow::WaitUntil(pacer.deadline()));
        }
        Event::LoopExiting => debug!("Event loop exiting"),
        _ => {}
    })?;

    outcome
}
