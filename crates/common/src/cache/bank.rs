//! Approximate-match item bank
//!
//! Previously generated items are pooled per subject and grade so a request
//! that misses the exact cache can still be served by sampling items that
//! passed a quality check earlier.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use parking_lot::RwLock;
use rand::seq::index;
use serde::Serialize;
use tracing::debug;

/// Item that can be pooled in the bank
pub trait BankEntry: Clone + Send + Sync + 'static {
    /// Topic label used for filtering
    fn topic(&self) -> &str;
}

/// Bank partition: subject × grade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BankBucket {
    subject: String,
    grade: String,
}

impl BankBucket {
    /// Subject is trimmed and lowercased so "Math" and "math " share a bucket;
    /// grade is trimmed
    pub fn new(subject: impl AsRef<str>, grade: impl fmt::Display) -> Self {
        Self {
            subject: subject.as_ref().trim().to_lowercase(),
            grade: grade.to_string().trim().to_string(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }
}

impl fmt::Display for BankBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.grade)
    }
}

/// Per-bucket pools of accepted items, capped and oldest-first truncated
pub struct ItemBank<T> {
    buckets: RwLock<HashMap<BankBucket, VecDeque<T>>>,
    capacity: usize,
}

impl<T: fmt::Debug> fmt::Debug for ItemBank<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemBank")
            .field("capacity", &self.capacity)
            .field("buckets", &self.buckets.read().len())
            .finish_non_exhaustive()
    }
}

impl<T: BankEntry> ItemBank<T> {
    /// Create a bank holding at most `capacity` items per bucket
    pub fn new(capacity: usize) -> Self {
        Self { buckets: RwLock::new(HashMap::new()), capacity }
    }

    /// Per-bucket capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append the items accepted by `predicate`, returning how many were kept
    ///
    /// When the bucket grows past capacity the oldest items are dropped.
    pub fn append<I, P>(&self, bucket: &BankBucket, items: I, predicate: P) -> usize
    where
        I: IntoIterator<Item = T>,
        P: Fn(&T) -> bool,
    {
        let accepted: Vec<T> = items.into_iter().filter(|item| predicate(item)).collect();
        if accepted.is_empty() {
            return 0;
        }

        let count = accepted.len();
        let mut buckets = self.buckets.write();
        let pool = buckets.entry(bucket.clone()).or_default();
        pool.extend(accepted);

        let overflow = pool.len().saturating_sub(self.capacity);
        pool.drain(..overflow);

        debug!(bucket = %bucket, accepted = count, dropped = overflow, size = pool.len(), "banked items");
        count
    }

    /// Sample `count` distinct items from a bucket
    ///
    /// With a non-empty `topics` filter, items whose topic equals one of the
    /// filters (case-insensitive) are preferred; if fewer than `count` match
    /// exactly, items whose topic contains a filter are used instead.
    /// Returns `None` when fewer than `count` items qualify.
    pub fn sample(&self, bucket: &BankBucket, count: usize, topics: &[String]) -> Option<Vec<T>> {
        let buckets = self.buckets.read();
        let pool = buckets.get(bucket)?;

        let candidates: Vec<usize> = if topics.is_empty() {
            (0..pool.len()).collect()
        } else {
            let filters: Vec<String> = topics.iter().map(|t| t.trim().to_lowercase()).collect();
            let matching = |contains: bool| -> Vec<usize> {
                pool.iter()
                    .enumerate()
                    .filter(|(_, item)| {
                        let topic = item.topic().to_lowercase();
                        filters.iter().any(|filter| {
                            if contains {
                                topic.contains(filter.as_str())
                            } else {
                                topic == *filter
                            }
                        })
                    })
                    .map(|(idx, _)| idx)
                    .collect()
            };

            let exact = matching(false);
            if exact.len() >= count {
                exact
            } else {
                matching(true)
            }
        };

        if candidates.len() < count {
            debug!(bucket = %bucket, requested = count, available = candidates.len(), "bank miss");
            return None;
        }

        let mut rng = rand::thread_rng();
        let picked = index::sample(&mut rng, candidates.len(), count)
            .into_iter()
            .filter_map(|i| pool.get(candidates[i]).cloned())
            .collect();
        Some(picked)
    }

    /// Number of items in a bucket
    pub fn len(&self, bucket: &BankBucket) -> usize {
        self.buckets.read().get(bucket).map_or(0, VecDeque::len)
    }

    /// Number of buckets that hold at least one item
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().values().filter(|pool| !pool.is_empty()).count()
    }

    /// Items held across every bucket
    pub fn total_items(&self) -> usize {
        self.buckets.read().values().map(VecDeque::len).sum()
    }
}
