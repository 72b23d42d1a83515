use std::fmt;
use std::time::Duration;

use tracing::info;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 20;

/// Cumulative snapshot emitted every `progress_interval` candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub company: String,
    /// Candidates handled so far, including ones skipped for missing detail.
    pub count: usize,
    /// Candidates queued for this run.
    pub total: usize,
    pub matched: usize,
    pub elapsed: Duration,
}

impl ProgressEvent {
    pub fn percent_complete(&self) -> Option<f64> {
        ratio(self.count, self.total).map(|ratio| ratio * 100.0)
    }

    pub fn match_rate(&self) -> Option<f64> {
        ratio(self.matched, self.count).map(|ratio| ratio * 100.0)
    }

    /// Linear extrapolation from the average time per candidate so far.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        if self.count == 0 || self.total == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.count) as f64;
        let per_candidate = self.elapsed.as_secs_f64() / self.count as f64;
        Some(Duration::from_secs_f64(per_candidate * remaining))
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

struct Unknown<T>(Option<T>);

impl fmt::Display for Unknown<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.1}%"),
            None => f.write_str("unknown"),
        }
    }
}

impl fmt::Display for Unknown<Duration> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.1}s", value.as_secs_f64()),
            None => f.write_str("unknown"),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} ({}) in {:.1}s, match rate {}, eta {}",
            self.company,
            self.count,
            self.total,
            Unknown(self.percent_complete()),
            self.elapsed.as_secs_f64(),
            Unknown(self.match_rate()),
            Unknown(self.estimated_remaining()),
        )
    }
}

/// Receives progress snapshots during a run.
pub trait ProgressSink {
    fn on_progress(&mut self, event: &ProgressEvent);
}

/// Default sink: one structured `info` line per snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        info!(
            company = %event.company,
            count = event.count,
            total = event.total,
            matched = event.matched,
            "{event}"
        );
    }
}

impl ProgressSink for Vec<ProgressEvent> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.push(event.clone());
    }
}
