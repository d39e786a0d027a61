//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Queue defaults
pub const DEFAULT_MAX_CONCURRENT: usize = 3;
pub const DEFAULT_INTER_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;
pub const DEFAULT_JOB_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

// Circuit breaker defaults
pub const DEFAULT_WINDOW_SIZE_MS: u64 = 10_000;
pub const DEFAULT_VOLUME_THRESHOLD: u32 = 10;
pub const DEFAULT_ERROR_THRESHOLD_PERCENTAGE: f64 = 50.0;
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// Cache defaults
pub const DEFAULT_CACHE_TTL_MS: u64 = 3_600_000;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;
pub const DEFAULT_BANK_CAPACITY: usize = 500;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 600_000;
pub const DEFAULT_BANK_MIN_QUALITY: f32 = 0.7;

// Estimator defaults
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_SLOW_ITEM_SECS: f64 = 180.0;
pub const DEFAULT_TOPIC_ACCURACY_FLOOR: f64 = 50.0;

// Score bands (weighted average, 0-100)
pub const ESCALATE_SCORE: f64 = 85.0;
pub const STEADY_SCORE: f64 = 70.0;
pub const PASSING_SCORE: f64 = 50.0;
/// Each of the last three medium-tier records must reach this to escalate
/// from the steady band
pub const STREAK_ESCALATE_SCORE: f64 = 80.0;
/// Each of the last three records below this downgrades from the passing band
pub const STREAK_DOWNGRADE_SCORE: f64 = 60.0;
pub const STREAK_LENGTH: usize = 3;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
