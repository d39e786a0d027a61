//! Normalized request signatures for the exact-match cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// BLAKE3 hex digest of a normalized set of request parameters
///
/// Parameters are hashed in name order and list-valued parameters are
/// sorted first, so equivalent requests map to the same key regardless of
/// how the caller ordered them.
///
/// ```
/// use quizgate_common::cache::CacheKey;
///
/// let a = CacheKey::builder().field("subject", "math").list("topics", ["b", "a"]).build();
/// let b = CacheKey::builder().list("topics", ["a", "b"]).field("subject", "math").build();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Start building a key
    pub fn builder() -> CacheKeyBuilder {
        CacheKeyBuilder::default()
    }

    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates named parameters for a [`CacheKey`]
#[derive(Debug, Default, Clone)]
pub struct CacheKeyBuilder {
    fields: BTreeMap<String, Value>,
}

impl CacheKeyBuilder {
    /// Add a scalar parameter; `None` values are hashed as null
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a list parameter; entries are trimmed and sorted
    pub fn list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> =
            values.into_iter().map(|value| value.as_ref().trim().to_string()).collect();
        entries.sort();
        self.fields.insert(name.into(), Value::from(entries));
        self
    }

    /// Hash the collected parameters
    pub fn build(self) -> CacheKey {
        let mut hasher = blake3::Hasher::new();
        for (name, value) in &self.fields {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.to_string().as_bytes());
            hasher.update(b";");
        }
        CacheKey(hex::encode(hasher.finalize().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates list parameters are order independent.
    ///
    /// Assertions:
    /// - Confirms `["b","a"]` and `["a","b"]` produce the same key.
    /// - Confirms the key is a 64-character hex digest.
    #[test]
    fn test_list_order_independent() {
        let a = CacheKey::builder().field("grade", 5).list("topics", ["b", "a"]).build();
        let b = CacheKey::builder().field("grade", 5).list("topics", ["a", "b"]).build();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_list_entries_trimmed() {
        let a = CacheKey::builder().list("topics", [" fractions ", "area"]).build();
        let b = CacheKey::builder().list("topics", ["area", "fractions"]).build();
        assert_eq!(a, b);
    }

    /// Validates distinct parameter values hash differently.
    #[test]
    fn test_distinct_values_differ() {
        let easy = CacheKey::builder().field("difficulty", "easy").build();
        let hard = CacheKey::builder().field("difficulty", "hard").build();
        assert_ne!(easy, hard);

        let unset = CacheKey::builder().field("difficulty", Option::<String>::None).build();
        assert_ne!(unset, easy);
    }

    #[test]
    fn test_field_names_participate() {
        let a = CacheKey::builder().field("subject", "math").build();
        let b = CacheKey::builder().field("topic", "math").build();
        assert_ne!(a, b);
    }
}
