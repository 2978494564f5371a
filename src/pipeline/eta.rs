use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

use super::PendingPaths;
use super::stats::RunStats;
use crate::progress::ProgressReporter;

pub const UNKNOWN_ETA: &str = "--:--:--";

/// Sliding window of per-tick drain counts.
#[derive(Debug, Clone)]
pub struct EtaWindow {
    samples: VecDeque<i64>,
    capacity: usize,
}

impl EtaWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a positive delta, evicting the oldest sample when full.
    /// Non-positive deltas are rejected and leave the window untouched.
    pub fn record(&mut self, delta: i64) -> bool {
        if delta <= 0 {
            return false;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(delta);
        true
    }

    /// Mean of the positive samples, `None` when there are none.
    pub fn mean_rate(&self) -> Option<f64> {
        let positive: Vec<i64> = self.samples.iter().copied().filter(|s| *s > 0).collect();
        if positive.is_empty() {
            return None;
        }
        Some(positive.iter().sum::<i64>() as f64 / positive.len() as f64)
    }

    pub fn estimate(&self, pending: usize, interval: Duration) -> Option<Duration> {
        let mean = self.mean_rate()?;
        let ticks = pending as f64 / mean;
        Some(Duration::from_secs_f64(ticks * interval.as_secs_f64()))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// `HH:MM:SS`, or `--:--:--` when unknown.
pub fn format_eta(remaining: Option<Duration>) -> String {
    match remaining {
        Some(remaining) => {
            let total = remaining.as_secs();
            let hours = total / 3600;
            let minutes = (total % 3600) / 60;
            let seconds = total % 60;
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        }
        None => UNKNOWN_ETA.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct EtaTracker {
    window: EtaWindow,
    interval: Duration,
}

impl EtaTracker {
    pub fn new(window: usize, interval: Duration) -> Self {
        Self {
            window: EtaWindow::new(window),
            interval,
        }
    }

    /// Feed one tick's before/after pending counts and return the display string.
    pub fn tick(&mut self, before: usize, after: usize) -> String {
        let delta = before as i64 - after as i64;
        if !self.window.record(delta) {
            return UNKNOWN_ETA.to_string();
        }
        format_eta(self.window.estimate(after, self.interval))
    }

    pub fn window(&self) -> &EtaWindow {
        &self.window
    }
}

/// Tracker loop. Ends as soon as `stop` disconnects, even mid-interval.
pub(crate) fn run_eta_tracker(
    mut tracker: EtaTracker,
    pending: &PendingPaths,
    stats: &RunStats,
    stop: Receiver<()>,
    reporter: &dyn ProgressReporter,
) {
    loop {
        let before = pending.len();
        match stop.recv_timeout(tracker.interval) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => break,
        }
        let after = pending.len();
        let eta = tracker.tick(before, after);
        trace!("ETA tick: {} -> {} pending, {}", before, after, eta);
        reporter.on_eta(&eta);
        reporter.on_hash_progress(&stats.snapshot());
    }
}
