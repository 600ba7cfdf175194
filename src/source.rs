// ============================================================================
// LINE SOURCES
// ============================================================================

use crate::error::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Port name that selects standard input instead of a serial device
pub const STDIN_PORT: &str = "-";

/// Default serial baud rate for the USB bridge
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Yields decoded text lines, one per call.
pub trait LineSource {
    /// `Ok(Some(line))` for a line, `Ok(None)` when nothing is available right
    /// now, `Err` once the source has terminated.
    fn next_line(&mut self) -> Result<Option<String>>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<Option<String>> {
        (**self).next_line()
    }
}

/// Splits a byte stream into lines.
///
/// A read timeout leaves the partial line buffered, so the next call picks up
/// where the previous one stopped.
pub struct LineReader<R> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        line
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(0) if self.pending.is_empty() => return Err(Error::SourceClosed),
                // Last line of the stream without a terminator
                Ok(0) => return Ok(Some(self.take_line())),
                Ok(_) if self.pending.ends_with(b"\n") => return Ok(Some(self.take_line())),
                Ok(_) => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Open a serial port (8N1, no flow control) as a line source.
///
/// # Arguments
/// * `path` - Serial port path (e.g., "/dev/ttyACM0")
/// * `baud_rate` - Baud rate (e.g., 115200)
/// * `timeout` - How long a read may block before the tick moves on
pub fn open_serial(
    path: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<LineReader<BufReader<Box<dyn SerialPort>>>> {
    let port = serialport::new(path, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(timeout)
        .open()?;

    log::info!("Opened serial port: {} at {} baud", path, baud_rate);

    Ok(LineReader::new(BufReader::new(port)))
}

/// Standard input as a line source, for replaying captured sensor output.
pub fn open_stdin() -> LineReader<io::StdinLock<'static>> {
    log::info!("Reading samples from standard input");
    LineReader::new(io::stdin().lock())
}

/// Open `port`, treating [`STDIN_PORT`] as standard input.
pub fn open_port(port: &str, baud_rate: u32, timeout: Duration) -> Result<Box<dyn LineSource>> {
    if port == STDIN_PORT {
        Ok(Box::new(open_stdin()))
    } else {
        Ok(Box::new(open_serial(port, baud_rate, timeout)?))
    }
}

/// Lines handed over from another thread.
pub struct ChannelSource {
    receiver: Receiver<String>,
    timeout: Duration,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<String>) -> Self {
        Self {
            receiver,
            timeout: Duration::from_millis(100),
        }
    }

    /// How long to wait for a line before reporting the source as momentarily empty
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl LineSource for ChannelSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.receiver.recv_timeout(self.timeout) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::SourceClosed),
        }
    }
}
