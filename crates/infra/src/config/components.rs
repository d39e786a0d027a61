//! Settings to component configuration
//!
//! The domain settings are plain serde structs with millisecond fields; the
//! runtime components take `Duration`s and their own enums.

use std::time::Duration;

use quizgate_common::cache::CacheConfig;
use quizgate_common::queue::{QueueConfig, RetryPlacement};
use quizgate_common::resilience::CircuitBreakerConfig;
use quizgate_domain::{BreakerSettings, CacheSettings, QueueSettings, RetryPosition};

/// Job queue configuration from settings
pub fn queue_config(settings: &QueueSettings) -> QueueConfig {
    QueueConfig {
        max_concurrent: settings.max_concurrent,
        inter_request_delay: Duration::from_millis(settings.inter_request_delay_ms),
        max_queue_size: settings.max_queue_size,
        timeout: Duration::from_millis(settings.timeout_ms),
        max_retries: settings.max_retries,
        retry_base_delay: Duration::from_millis(settings.retry_base_delay_ms),
        retry_placement: retry_placement(settings.retry_position),
        ..QueueConfig::default()
    }
}

/// Circuit breaker configuration from settings
pub fn breaker_config(settings: &BreakerSettings) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        window_size: Duration::from_millis(settings.window_size_ms),
        volume_threshold: u64::from(settings.volume_threshold),
        error_threshold_percentage: settings.error_threshold_percentage,
        reset_timeout: Duration::from_millis(settings.reset_timeout_ms),
        request_timeout: Duration::from_millis(settings.request_timeout_ms),
        failure_threshold: settings.failure_threshold,
    }
}

/// Result cache and item bank configuration from settings
pub fn cache_config(settings: &CacheSettings) -> CacheConfig {
    CacheConfig {
        ttl: Duration::from_millis(settings.ttl_ms),
        max_entries: settings.max_entries,
        bank_capacity: settings.bank_capacity,
        sweep_interval: Duration::from_millis(settings.sweep_interval_ms),
    }
}

fn retry_placement(position: RetryPosition) -> RetryPlacement {
    match position {
        RetryPosition::Tail => RetryPlacement::Tail,
        RetryPosition::Head => RetryPlacement::Head,
    }
}
