//! Rolling error-rate window used by the circuit breaker.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Time-bounded window of call outcomes.
///
/// Samples older than the horizon are dropped on [`prune`](Self::prune).
/// The failure count is maintained incrementally so every query is O(1)
/// after pruning.
#[derive(Debug, Clone)]
pub struct ErrorRateWindow {
    horizon: Duration,
    samples: VecDeque<(Instant, bool)>,
    failures: u64,
}

impl ErrorRateWindow {
    /// Create an empty window covering `horizon`
    pub fn new(horizon: Duration) -> Self {
        Self { horizon, samples: VecDeque::new(), failures: 0 }
    }

    /// Record an outcome observed at `at`; `success = false` counts as a failure
    pub fn record(&mut self, at: Instant, success: bool) {
        if !success {
            self.failures += 1;
        }
        self.samples.push_back((at, success));
    }

    /// Drop samples recorded more than `horizon` before `now`
    pub fn prune(&mut self, now: Instant) {
        while let Some(&(at, success)) = self.samples.front() {
            if now.saturating_duration_since(at) <= self.horizon {
                break;
            }
            self.samples.pop_front();
            if !success {
                self.failures = self.failures.saturating_sub(1);
            }
        }
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of failures currently held
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Failure percentage in `[0, 100]`; zero for an empty window
    #[allow(clippy::cast_precision_loss)]
    pub fn error_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.failures as f64 / self.samples.len() as f64 * 100.0
    }

    /// Window horizon
    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    /// Remove every sample
    pub fn clear(&mut self) {
        self.samples.clear();
        self.failures = 0;
    }
}
