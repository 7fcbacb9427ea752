//! Fixed-capacity least-recently-used cache.

use std::collections::HashMap;
use std::hash::Hash;

/// A bounded map that evicts its least recently used entry once an insert
/// pushes it past capacity.
///
/// Both [`get`](Self::get) and [`insert`](Self::insert) count as a use.
///
/// # Example
///
/// ```
/// use horizon_grid::nested::BoundedCache;
///
/// let mut cache = BoundedCache::new(2);
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// cache.get(&"a");
/// let evicted = cache.insert("c", 3);
/// assert_eq!(evicted, Some(("b", 2)));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, (V, u64)>,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity + 1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.tick();
        let (value, used) = self.entries.get_mut(key)?;
        *used = now;
        Some(value)
    }

    /// Look up `key` without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Insert or replace `key`; returns the entry evicted to make room.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let now = self.tick();
        self.entries.insert(key, (value, now));
        if self.entries.len() <= self.capacity {
            return None;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, (_, used))| *used)
            .map(|(key, _)| key.clone())?;
        self.entries
            .remove_entry(&oldest)
            .map(|(key, (value, _))| (key, value))
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    /// Returns `true` if `key` is cached.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = BoundedCache::new(3);
        for key in 0..3 {
            assert_eq!(cache.insert(key, key * 10), None);
        }
        cache.get(&0);
        assert_eq!(cache.insert(3, 30), Some((1, 10)));
        assert!(cache.contains_key(&0));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_peek_does_not_touch() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_eq!(cache.insert("c", 3), Some(("a", 1)));
    }

    #[test]
    fn test_replace_does_not_evict() {
        let mut cache = BoundedCache::new(1);
        cache.insert(1, "a");
        assert_eq!(cache.insert(1, "b"), None);
        assert_eq!(cache.remove(&1), Some("b"));
        assert!(cache.is_empty());
    }
}
