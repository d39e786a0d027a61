use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

/// Incrementally updated mean, O(1) space
#[derive(Debug, Default, Clone, Copy)]
struct RunningAverage {
    count: u64,
    mean_ms: f64,
}

impl RunningAverage {
    #[allow(clippy::cast_precision_loss)]
    fn push(&mut self, sample: Duration) {
        self.count += 1;
        let sample_ms = sample.as_secs_f64() * 1000.0;
        self.mean_ms += (sample_ms - self.mean_ms) / self.count as f64;
    }
}

/// Queue metrics for monitoring
#[derive(Debug, Default)]
pub struct QueueMetrics {
    total_queued: AtomicU64,
    total_processed: AtomicU64,
    total_errored: AtomicU64,
    total_retried: AtomicU64,
    total_cancelled: AtomicU64,
    total_rejected: AtomicU64,
    wait_time: Mutex<RunningAverage>,
    process_time: Mutex<RunningAverage>,
}

impl QueueMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record admission
    pub fn record_enqueue(&self) {
        self.total_queued.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Record a capacity rejection
    pub fn record_rejection(&self) {
        self.total_rejected.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Record the time an item waited before its first attempt
    pub fn record_wait(&self, wait: Duration) {
        self.wait_time.lock().push(wait);
    }

    /// Record successful completion
    pub fn record_completion(&self, processing: Duration) {
        self.total_processed.fetch_add(1, AtomicOrdering::Relaxed);
        self.process_time.lock().push(processing);
    }

    /// Record terminal failure
    pub fn record_failure(&self, processing: Duration) {
        self.total_errored.fetch_add(1, AtomicOrdering::Relaxed);
        self.process_time.lock().push(processing);
    }

    /// Record retry
    pub fn record_retry(&self) {
        self.total_retried.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Record cancellation (drained, abandoned or rejected on shutdown)
    pub fn record_cancellation(&self, count: u64) {
        self.total_cancelled.fetch_add(count, AtomicOrdering::Relaxed);
    }

    /// Get metrics snapshot
    pub fn snapshot(&self) -> QueueStatsSnapshot {
        QueueStatsSnapshot {
            total_queued: self.total_queued.load(AtomicOrdering::Relaxed),
            total_processed: self.total_processed.load(AtomicOrdering::Relaxed),
            total_errored: self.total_errored.load(AtomicOrdering::Relaxed),
            total_retried: self.total_retried.load(AtomicOrdering::Relaxed),
            total_cancelled: self.total_cancelled.load(AtomicOrdering::Relaxed),
            total_rejected: self.total_rejected.load(AtomicOrdering::Relaxed),
            avg_wait_ms: self.wait_time.lock().mean_ms,
            avg_process_ms: self.process_time.lock().mean_ms,
        }
    }
}

/// Snapshot of queue metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueStatsSnapshot {
    pub total_queued: u64,
    pub total_processed: u64,
    pub total_errored: u64,
    pub total_retried: u64,
    pub total_cancelled: u64,
    pub total_rejected: u64,
    pub avg_wait_ms: f64,
    pub avg_process_ms: f64,
}
