// ============================================================================
// FRAME LOOP
// ============================================================================

use crate::composer::compose;
use crate::config::{Theme, ViewConfig};
use crate::error::{Error, Result};
use crate::geometry::{to_cartesian, Point};
use crate::sample::parse;
use crate::scan_buffer::ScanBuffer;
use crate::source::LineSource;
use crate::surface::DrawingSurface;
use log::{debug, trace};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// How much of the source one tick may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestPolicy {
    /// Stop once this many valid points were accepted
    pub points_per_tick: usize,
    /// Stop once this many raw lines were read, valid or not
    pub max_lines_per_tick: usize,
}

impl IngestPolicy {
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            points_per_tick: config.point_quota(),
            max_lines_per_tick: config.line_budget(),
        }
    }
}

/// Outcome of one ingestion step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
    /// The source ran dry before the quota was met
    pub stalled: bool,
}

/// Totals since the loop started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub accepted: u64,
    pub rejected: u64,
}

/// Keeps ticks at or below a fixed rate.
#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    last_tick: Option<Instant>,
}

impl TickPacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_tick: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Earliest moment the next tick may start
    pub fn deadline(&self) -> Instant {
        match self.last_tick {
            Some(last) => last + self.period,
            None => Instant::now(),
        }
    }

    /// An unmarked pacer is always due
    pub fn is_due(&self) -> bool {
        self.last_tick
            .map_or(true, |last| Instant::now() >= last + self.period)
    }

    /// Record that a tick starts now
    pub fn mark(&mut self) {
        self.last_tick = Some(Instant::now());
    }

    /// Sleep until the next tick is due, then mark it
    pub fn wait(&mut self) {
        let remaining = self.deadline().saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.mark();
    }
}

/// Pulls samples, maintains the scan window and redraws it, one tick at a time.
pub struct FrameLoop<S> {
    source: S,
    buffer: ScanBuffer,
    policy: IngestPolicy,
    theme: Theme,
    state: LoopState,
    stop_requested: bool,
    stats: LoopStats,
}

impl<S: LineSource> FrameLoop<S> {
    pub fn new(source: S, config: &ViewConfig) -> Self {
        let policy = IngestPolicy::from_config(config);
        debug!(
            "Frame loop: history {}, {} points/tick, {} lines/tick max",
            config.point_history, policy.points_per_tick, policy.max_lines_per_tick
        );
        Self {
            source,
            buffer: ScanBuffer::new(config.point_history),
            policy,
            theme: config.theme.clone(),
            state: LoopState::Running,
            stop_requested: false,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn buffer(&self) -> &ScanBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn policy(&self) -> IngestPolicy {
        self.policy
    }

    /// Ask the loop to stop at the next tick boundary
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Read lines into the scan window until the quota, the line budget, or a dry source.
    pub fn ingest(&mut self) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut lines_read = 0;

        while report.accepted < self.policy.points_per_tick
            && lines_read < self.policy.max_lines_per_tick
        {
            let Some(line) = self.source.next_line()? else {
                report.stalled = true;
                break;
            };
            lines_read += 1;

            match parse(&line) {
                Ok(sample) => {
                    self.buffer.push(to_cartesian(sample));
                    report.accepted += 1;
                }
                Err(e) => {
                    trace!("Discarding line {:?}: {}", line, e);
                    report.rejected += 1;
                }
            }
        }

        self.stats.accepted += report.accepted as u64;
        self.stats.rejected += report.rejected as u64;
        Ok(report)
    }

    /// Run one tick: honour a pending stop, ingest, then compose and present.
    ///
    /// A closed source or a failed surface stops the loop and returns the error.
    pub fn tick<D: DrawingSurface + ?Sized>(&mut self, surface: &mut D) -> Result<LoopState> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        if self.stop_requested {
            debug!("Stop requested after {} frames", self.stats.frames);
            self.state = LoopState::Stopped;
            return Ok(self.state);
        }

        let report = self.ingest().inspect_err(|_| self.state = LoopState::Stopped)?;
        trace!(
            "Tick {}: {} accepted, {} rejected{}",
            self.stats.frames,
            report.accepted,
            report.rejected,
            if report.stalled { ", source stalled" } else { "" }
        );

        let (width, height) = surface.size();
        let centre = Point::new(f64::from(width / 2), f64::from(height / 2));
        let size = width.min(height);
        compose(surface, centre, self.buffer.snapshot(), size, &self.theme).map_err(|e| {
            self.state = LoopState::Stopped;
            Error::from(e)
        })?;

        self.stats.frames += 1;
        Ok(self.state)
    }

    /// Tick until stopped, pacing to `period`. `shutdown` is polled before every tick.
    pub fn run<D, F>(&mut self, surface: &mut D, period: Duration, mut shutdown: F) -> Result<()>
    where
        D: DrawingSurface + ?Sized,
        F: FnMut() -> bool,
    {
        let mut pacer = TickPacer::new(period);
        loop {
            pacer.wait();
            if shutdown() {
                self.request_stop();
            }
            if self.tick(surface)? == LoopState::Stopped {
                return Ok(());
            }
        }
    }
}
