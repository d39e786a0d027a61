//! Exact-match result cache with TTL and insertion-order eviction
//!
//! Entries are keyed by [`CacheKey`]. Freshness is checked on every read, so
//! a stale entry is never served even if the background sweep has not run.
//! When full, the oldest-inserted entry is evicted regardless of its age.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::config::CacheConfig;
use super::key::CacheKey;
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::{Clock, SystemClock};

/// Payload returned by a cache hit together with its age
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPayload<V> {
    pub payload: V,
    pub age: Duration,
}

#[derive(Debug)]
struct CacheEntry<V> {
    payload: V,
    inserted_at: Instant,
}

#[derive(Debug)]
struct CacheStorage<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// Keys in insertion order, oldest first
    insertion_order: VecDeque<CacheKey>,
}

impl<V> CacheStorage<V> {
    fn new() -> Self {
        Self { entries: HashMap::new(), insertion_order: VecDeque::new() }
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.insertion_order.retain(|k| k != key);
        Some(entry)
    }
}

/// Thread-safe TTL cache for generation results
///
/// # Example
/// ```
/// use quizgate_common::cache::{CacheConfig, CacheKey, ResultCache};
///
/// let cache: ResultCache<Vec<String>> = ResultCache::new(CacheConfig::default());
/// let key = CacheKey::builder().field("subject", "math").build();
/// cache.put(key.clone(), vec!["2 + 2".to_string()]);
/// assert_eq!(cache.get(&key).map(|hit| hit.payload.len()), Some(1));
/// ```
pub struct ResultCache<V, C = SystemClock>
where
    C: Clock,
{
    storage: RwLock<CacheStorage<V>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<V> ResultCache<V, SystemClock>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<V, C> ResultCache<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: RwLock::new(CacheStorage::new()),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a fresh entry
    ///
    /// Returns `None` when the key is absent or the entry is at least `ttl`
    /// old; a stale entry is removed as part of the lookup.
    pub fn get(&self, key: &CacheKey) -> Option<CachedPayload<V>> {
        let now = self.clock.now();
        let storage = self.storage.upgradable_read();

        let Some(entry) = storage.entries.get(key) else {
            self.metrics.record_miss();
            return None;
        };

        let age = now.saturating_duration_since(entry.inserted_at);
        if age < self.config.ttl {
            self.metrics.record_hit();
            trace!(key = %key, age_ms = age.as_millis(), "result cache hit");
            return Some(CachedPayload { payload: entry.payload.clone(), age });
        }

        let mut storage = RwLockUpgradableReadGuard::upgrade(storage);
        storage.remove(key);
        self.metrics.record_expirations(1);
        self.metrics.record_miss();
        debug!(key = %key, age_ms = age.as_millis(), "evicted stale cache entry on read");
        None
    }

    /// Insert a payload
    ///
    /// Overwriting an existing key refreshes its insertion instant. Inserting
    /// a new key into a full cache first evicts the oldest-inserted key.
    pub fn put(&self, key: CacheKey, payload: V) {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        if storage.remove(&key).is_none() && storage.entries.len() >= self.config.max_entries {
            if let Some(oldest) = storage.insertion_order.pop_front() {
                storage.entries.remove(&oldest);
                self.metrics.record_eviction();
                debug!(key = %oldest, "evicted oldest cache entry");
            }
        }

        storage.insertion_order.push_back(key.clone());
        storage.entries.insert(key, CacheEntry { payload, inserted_at: now });
        self.metrics.record_insert();
    }

    /// Remove an entry
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.storage.write().remove(key).map(|entry| entry.payload)
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut storage = self.storage.write();

        let before = storage.entries.len();
        storage.entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
        let removed = before - storage.entries.len();

        if removed > 0 {
            let CacheStorage { entries, insertion_order } = &mut *storage;
            insertion_order.retain(|key| entries.contains_key(key));
            self.metrics.record_expirations(removed as u64);
            debug!(removed, remaining = entries.len(), "swept expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including stale ones not yet swept
    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.storage.read().entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        storage.entries.clear();
        storage.insertion_order.clear();
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len(), self.config.max_entries)
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` on the
    /// current Tokio runtime
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("result cache dropped, stopping sweeper");
                    break;
                };
                cache.sweep_expired();
            }
        })
    }
}
