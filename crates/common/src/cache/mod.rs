//! Two-tier result caching in front of the item generator
//!
//! - [`ResultCache`]: exact-match cache keyed by a normalized
//!   [`CacheKey`], with read-time TTL checks and insertion-order eviction
//! - [`ItemBank`]: per subject × grade pools of quality-checked items that
//!   can be sampled when the exact cache misses
//!
//! Both tiers are `Send + Sync` and meant to be shared behind an `Arc`.
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use quizgate_common::cache::{CacheConfig, CacheKey, ResultCache};
//!
//! let config = CacheConfig::builder().ttl(Duration::from_secs(600)).max_entries(10).build()?;
//! let cache: ResultCache<String> = ResultCache::new(config);
//!
//! let key = CacheKey::builder().field("subject", "math").list("topics", ["b", "a"]).build();
//! cache.put(key.clone(), "payload".to_string());
//! assert!(cache.get(&key).is_some());
//! # Ok::<(), quizgate_common::resilience::ConfigError>(())
//! ```

pub mod bank;
pub mod config;
pub mod exact;
pub mod key;
pub mod stats;

pub use bank::{BankBucket, BankEntry, ItemBank};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use exact::{CachedPayload, ResultCache};
pub use key::{CacheKey, CacheKeyBuilder};
pub use stats::{CacheStats, CacheStatus};
