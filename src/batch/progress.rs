use crate::pipeline::ItemOutcome;
use std::time::Duration;

/// Running totals for a batch, updated once per finished item.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    total: usize,
    processed: usize,
    cumulative: Duration,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            cumulative: Duration::ZERO,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.processed += 1;
        self.cumulative += elapsed;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed)
    }

    pub fn cumulative(&self) -> Duration {
        self.cumulative
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn average(&self) -> Option<Duration> {
        if self.processed == 0 {
            return None;
        }
        Some(self.cumulative / to_u32(self.processed))
    }

    /// Average time per finished item times the items still to go.
    pub fn estimated_remaining(&self) -> Duration {
        self.average()
            .map(|average| average * to_u32(self.remaining()))
            .unwrap_or(Duration::ZERO)
    }
}

fn to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Per-class tally of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_time: Duration,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &ItemOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else if outcome.is_skipped() {
            self.skipped += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
