//! Configuration structures
//!
//! Every field has a serde default, so a config file only needs the values
//! it overrides. Durations are plain milliseconds (`*_ms`).

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{QuizgateError, Result};
use crate::impl_domain_label_conversions;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub queue: QueueSettings,
    pub breaker: BreakerSettings,
    pub cache: CacheSettings,
    pub estimator: EstimatorSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Check every section
    ///
    /// # Errors
    /// Returns `QuizgateError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.queue.validate()?;
        self.breaker.validate()?;
        self.cache.validate()?;
        self.estimator.validate()
    }
}

/// Where a retried job re-enters the backlog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryPosition {
    #[default]
    Tail,
    Head,
}

impl_domain_label_conversions!(RetryPosition {
    Tail => "tail",
    Head => "head",
});

/// Job queue limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub max_concurrent: usize,
    pub inter_request_delay_ms: u64,
    pub max_queue_size: usize,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_position: RetryPosition,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            inter_request_delay_ms: DEFAULT_INTER_REQUEST_DELAY_MS,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            timeout_ms: DEFAULT_JOB_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_position: RetryPosition::Tail,
        }
    }
}

impl QueueSettings {
    fn validate(&self) -> Result<()> {
        ensure(self.max_concurrent > 0, "queue.max_concurrent must be greater than 0")?;
        ensure(self.max_queue_size > 0, "queue.max_queue_size must be greater than 0")?;
        ensure(self.timeout_ms > 0, "queue.timeout_ms must be greater than 0")
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub window_size_ms: u64,
    pub volume_threshold: u32,
    pub error_threshold_percentage: f64,
    pub reset_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Optional minimum number of failures in the window before tripping
    pub failure_threshold: Option<u64>,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            window_size_ms: DEFAULT_WINDOW_SIZE_MS,
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            error_threshold_percentage: DEFAULT_ERROR_THRESHOLD_PERCENTAGE,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            failure_threshold: None,
        }
    }
}

impl BreakerSettings {
    fn validate(&self) -> Result<()> {
        ensure(self.window_size_ms > 0, "breaker.window_size_ms must be greater than 0")?;
        ensure(self.volume_threshold > 0, "breaker.volume_threshold must be greater than 0")?;
        ensure(
            self.error_threshold_percentage > 0.0 && self.error_threshold_percentage <= 100.0,
            "breaker.error_threshold_percentage must be within (0, 100]",
        )?;
        ensure(
            self.reset_timeout_ms > 0 && self.request_timeout_ms > 0,
            "breaker.reset_timeout_ms and breaker.request_timeout_ms must be greater than 0",
        )?;
        ensure(
            self.failure_threshold != Some(0),
            "breaker.failure_threshold must be greater than 0 when set",
        )
    }
}

/// Result cache and item bank limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_ms: u64,
    pub max_entries: usize,
    pub bank_capacity: usize,
    pub sweep_interval_ms: u64,
    /// Generated items below this quality score are kept out of the bank
    pub bank_min_quality: f32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            bank_capacity: DEFAULT_BANK_CAPACITY,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            bank_min_quality: DEFAULT_BANK_MIN_QUALITY,
        }
    }
}

impl CacheSettings {
    fn validate(&self) -> Result<()> {
        ensure(self.ttl_ms > 0, "cache.ttl_ms must be greater than 0")?;
        ensure(self.max_entries > 0, "cache.max_entries must be greater than 0")?;
        ensure(self.bank_capacity > 0, "cache.bank_capacity must be greater than 0")?;
        ensure(self.sweep_interval_ms > 0, "cache.sweep_interval_ms must be greater than 0")?;
        ensure(
            (0.0..=1.0).contains(&self.bank_min_quality),
            "cache.bank_min_quality must be within 0.0-1.0",
        )
    }
}

/// Adaptive difficulty estimator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Number of most recent records considered
    pub history_limit: usize,
    /// Average seconds per item above which the tier is eased
    pub slow_item_secs: f64,
    /// Topic accuracy (percent) below which the tier is forced to easy
    pub topic_accuracy_floor: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            slow_item_secs: DEFAULT_SLOW_ITEM_SECS,
            topic_accuracy_floor: DEFAULT_TOPIC_ACCURACY_FLOOR,
        }
    }
}

impl EstimatorSettings {
    fn validate(&self) -> Result<()> {
        ensure(self.history_limit > 0, "estimator.history_limit must be greater than 0")?;
        ensure(self.slow_item_secs > 0.0, "estimator.slow_item_secs must be positive")
    }
}

/// Tracing output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `quizgate_core=debug,info`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(QuizgateError::Config(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue.max_concurrent, 3);
        assert_eq!(config.breaker.reset_timeout_ms, 60_000);
        assert_eq!(config.cache.ttl_ms, 3_600_000);
        assert_eq!(config.estimator.history_limit, 10);
    }

    /// Validates partial files keep defaults for omitted fields.
    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"queue": {"max_concurrent": 5, "retry_position": "head"}}"#;
        let config: Config = serde_json::from_str(json).expect("valid config");
        assert_eq!(config.queue.max_concurrent, 5);
        assert_eq!(config.queue.retry_position, RetryPosition::Head);
        assert_eq!(config.queue.max_queue_size, 100);
        assert_eq!(config.breaker, BreakerSettings::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = "[breaker]\nvolume_threshold = 3\nfailure_threshold = 2\n";
        let config: Config = toml::from_str(raw).expect("valid config");
        assert_eq!(config.breaker.volume_threshold, 3);
        assert_eq!(config.breaker.failure_threshold, Some(2));
        assert_eq!(config.queue, QueueSettings::default());
    }

    #[test]
    fn test_validate_names_field() {
        let mut config = Config::default();
        config.breaker.error_threshold_percentage = 120.0;
        let err = config.validate().expect_err("out of range");
        assert!(err.to_string().contains("breaker.error_threshold_percentage"));
    }

    #[test]
    fn test_retry_position_parses() {
        assert_eq!("HEAD".parse::<RetryPosition>(), Ok(RetryPosition::Head));
        assert!("middle".parse::<RetryPosition>().is_err());
    }
}
