//! Cooperative progress reporting and cancellation.

use std::time::{Duration, Instant};

use crate::error::{Result, ScanError};

/// Receives periodic progress reports during a scan.
///
/// The engine yields to the monitor at least once per wall-clock
/// second of continuous work, and at the start of each alignment.
/// Returning `false` cancels the scan: the engine stops at that yield
/// point without emitting the in-progress alignment's partial ranges.
pub trait ScanMonitor {
    /// Report fractional progress in `[0, 1]` and the chainage label
    /// currently being scanned. Return `false` to cancel.
    fn progress(&mut self, fraction: f64, chainage: &str) -> bool;
}

/// A monitor that ignores progress and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMonitor;

impl ScanMonitor for NullMonitor {
    fn progress(&mut self, _fraction: f64, _chainage: &str) -> bool {
        true
    }
}

/// Paces yields to the monitor: forwards a report when the interval
/// has elapsed (or when forced) and translates a refusal into
/// [`ScanError::Cancelled`].
pub struct Pacer {
    interval: Duration,
    last: Instant,
}

impl Pacer {
    /// Standard pacing: one report per second of continuous work.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    /// Pacing with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// Yield to the monitor if the interval has elapsed.
    pub fn tick(
        &mut self,
        monitor: &mut dyn ScanMonitor,
        fraction: f64,
        chainage: &str,
    ) -> Result<()> {
        if self.last.elapsed() < self.interval {
            return Ok(());
        }
        self.force(monitor, fraction, chainage)
    }

    /// Yield to the monitor unconditionally.
    pub fn force(
        &mut self,
        monitor: &mut dyn ScanMonitor,
        fraction: f64,
        chainage: &str,
    ) -> Result<()> {
        self.last = Instant::now();
        if monitor.progress(fraction, chainage) {
            Ok(())
        } else {
            Err(ScanError::Cancelled)
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
