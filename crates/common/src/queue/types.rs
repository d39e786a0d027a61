use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

use super::errors::QueueResult;
use super::work::WorkUnit;

/// Identifier assigned to every admitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Item status in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

/// Where a failed item re-enters the backlog after its backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPlacement {
    /// Behind everything already waiting
    #[default]
    Tail,
    /// Ahead of everything already waiting
    Head,
}

/// Queue configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of items executing at once
    pub max_concurrent: usize,
    /// Minimum gap between two successive pops from the backlog
    pub inter_request_delay: Duration,
    /// Backlog size at which `enqueue` starts failing with `Full`
    pub max_queue_size: usize,
    /// Per-attempt deadline, captured when an item is admitted
    pub timeout: Duration,
    /// Retries after the first attempt, captured when an item is admitted
    pub max_retries: u32,
    /// Backoff base; the n-th retry waits `retry_base_delay * 2^n`
    pub retry_base_delay: Duration,
    pub retry_placement: RetryPlacement,
    /// Buffer of the lifecycle event channel
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            inter_request_delay: Duration::from_millis(500),
            max_queue_size: 100,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            retry_placement: RetryPlacement::Tail,
            event_capacity: 256,
        }
    }
}

impl QueueConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".to_string());
        }

        if self.max_queue_size == 0 {
            return Err("max_queue_size must be greater than 0".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Backoff before the given retry (1-based)
    pub fn retry_delay(&self, retry: u32) -> Duration {
        self.retry_base_delay.saturating_mul(2_u32.saturating_pow(retry))
    }
}

/// Partial update applied by `JobQueue::configure`; `None` keeps the current
/// value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueConfigUpdate {
    pub max_concurrent: Option<usize>,
    pub inter_request_delay: Option<Duration>,
    pub max_queue_size: Option<usize>,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
}

impl QueueConfigUpdate {
    /// Apply the set fields to `config`
    pub fn apply_to(&self, config: &mut QueueConfig) {
        if let Some(value) = self.max_concurrent {
            config.max_concurrent = value;
        }
        if let Some(value) = self.inter_request_delay {
            config.inter_request_delay = value;
        }
        if let Some(value) = self.max_queue_size {
            config.max_queue_size = value;
        }
        if let Some(value) = self.timeout {
            config.timeout = value;
        }
        if let Some(value) = self.max_retries {
            config.max_retries = value;
        }
    }
}

/// Admitted unit of work owned by the queue until it resolves
pub(crate) struct QueueItem<T> {
    pub id: JobId,
    pub work: Arc<dyn WorkUnit<T>>,
    pub enqueued_at: Instant,
    pub first_started_at: Option<Instant>,
    pub status: ItemStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    pub timeout: Duration,
    pub completion: oneshot::Sender<QueueResult<T>>,
}

impl<T> QueueItem<T> {
    /// Whether the caller dropped its handle
    pub fn is_abandoned(&self) -> bool {
        self.completion.is_closed()
    }

    /// Resolve the caller's handle; a dropped handle is ignored
    pub fn resolve(self, result: QueueResult<T>) {
        let _ = self.completion.send(result);
    }
}

impl<T> fmt::Debug for QueueItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("retry_count", &self.retry_count)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QueueConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.max_queue_size, 100);
        assert_eq!(config.retry_placement, RetryPlacement::Tail);
    }

    /// Validates `QueueConfig::validate` behavior for zero limits.
    #[test]
    fn test_config_validation_rejects_zero_limits() {
        let config = QueueConfig { max_concurrent: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = QueueConfig { max_queue_size: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = QueueConfig { timeout: Duration::ZERO, ..Default::default() };
        assert!(config.validate().is_err());
    }

    /// Validates exponential backoff doubles per retry.
    ///
    /// Assertions:
    /// - Confirms retries 1..=3 wait 2s, 4s and 8s with a 1s base.
    #[test]
    fn test_retry_delay_doubles() {
        let config = QueueConfig::default();
        assert_eq!(config.retry_delay(1), Duration::from_secs(2));
        assert_eq!(config.retry_delay(2), Duration::from_secs(4));
        assert_eq!(config.retry_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut config = QueueConfig::default();
        let update = QueueConfigUpdate {
            max_concurrent: Some(5),
            timeout: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        update.apply_to(&mut config);

        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.max_queue_size, 100);
        assert_eq!(config.max_retries, 3);
    }
}
