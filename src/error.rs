// ============================================================================
// ERRORS
// ============================================================================

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a run. Per-line and per-frame problems never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The line source reached end of stream
    #[error("line source closed")]
    SourceClosed,

    /// I/O error while reading the line source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened or configured
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The drawing surface failed
    #[error("Drawing surface failure: {0}")]
    Surface(#[from] SurfaceError),

    /// Label font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Window event loop could not be created or run
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window creation failed
    #[error("Window error: {0}")]
    Os(#[from] winit::error::OsError),

    /// Pixel buffer creation failed
    #[error("Pixel buffer error: {0}")]
    Pixels(#[from] pixels::Error),
}

/// A drawing surface could not present or resize its frame.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("failed to present frame: {0}")]
    Present(#[from] pixels::Error),

    #[error("failed to resize frame: {0}")]
    Resize(#[from] pixels::TextureError),

    /// Frame buffer length does not match the surface dimensions
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}
