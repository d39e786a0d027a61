//! Cache configuration types and builder patterns
//!
//! One config covers both tiers: the exact-match result cache (TTL and
//! entry cap) and the per-bucket item bank capacity.

use std::time::Duration;

use crate::resilience::{ConfigError, ConfigResult};

/// Configuration for the result cache and item bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent
    pub ttl: Duration,

    /// Maximum number of exact-cache entries before the oldest is evicted
    pub max_entries: usize,

    /// Maximum number of items kept per item-bank bucket
    pub bank_capacity: usize,

    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_entries: 100,
            bank_capacity: 500,
            sweep_interval: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for a TTL cache with the given entry cap
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use quizgate_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl_fifo(Duration::from_secs(300), 50);
    /// assert_eq!(config.max_entries, 50);
    /// ```
    pub fn ttl_fifo(ttl: Duration, max_entries: usize) -> Self {
        Self { ttl, max_entries, ..Self::default() }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ttl.is_zero() {
            return Err(ConfigError::Invalid { message: "ttl must be greater than 0".to_string() });
        }
        if self.max_entries == 0 || self.bank_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "max_entries and bank_capacity must be greater than 0".to_string(),
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                message: "sweep_interval must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time-to-live for entries
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.config.ttl = duration;
        self
    }

    /// Set maximum number of exact-cache entries
    pub fn max_entries(mut self, entries: usize) -> Self {
        self.config.max_entries = entries;
        self
    }

    /// Set per-bucket item bank capacity
    pub fn bank_capacity(mut self, capacity: usize) -> Self {
        self.config.bank_capacity = capacity;
        self
    }

    /// Set background sweep period
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `CacheConfig::default` values.
    ///
    /// Assertions:
    /// - Confirms one hour TTL, 100 entries and 500 bank items.
    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.bank_capacity, 500);
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        assert!(CacheConfig::builder().max_entries(0).build().is_err());
        assert!(CacheConfig::builder().ttl(Duration::ZERO).build().is_err());
        let config = CacheConfig::builder().bank_capacity(3).build().expect("valid config");
        assert_eq!(config.bank_capacity, 3);
    }
}
