//! Process-local TTL cache used to memoize geocoder and routing responses.
//!
//! Keys are SHA-256 hex digests of a caller-normalized input string. There is no negative
//! caching: failures are never inserted, so a transient upstream error does not constrain
//! the next attempt.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Hex-encodes the SHA-256 digest of `input`.
#[must_use]
pub fn digest_key(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A TTL-keyed memoization cache.
///
/// `V` must be cheap to clone (responses are small JSON-derived structs); a lookup clones
/// out of the map rather than holding a guard across an `await`.
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached value for `key`, evicting it first if its TTL has lapsed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.expires_at <= Instant::now(),
            None => return None,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Inserts `value` under `key` with the given time-to-live.
    pub fn insert(&self, key: String, value: V, ttl: Duration) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_key_is_stable_and_case_sensitive() {
        let a = digest_key("tulsa, ok|us");
        let b = digest_key("tulsa, ok|us");
        let c = digest_key("Tulsa, OK|us");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn miss_then_hit_then_expiry() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert_eq!(cache.get("k"), None);

        cache.insert("k".to_string(), 42, Duration::from_millis(50));
        assert_eq!(cache.get("k"), Some(42));

        std::thread::sleep(Duration::from_millis(75));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }
}
