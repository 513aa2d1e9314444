//! Keyed cache of shared handles.
//!
//! A [`MemoCache`] hands out `Rc<V>` handles so that every request for the
//! same key while a handle is alive yields the *same* allocation. It is used
//! to avoid building duplicate notification chains for derived streams.
//!
//! # Eviction
//!
//! An entry is evictable once the cache holds the only strong reference to
//! it. Such entries are pruned before each insertion, so the cache size is
//! bounded by the number of handles callers still hold (plus at most one
//! freshly inserted entry). [`MemoCache::remove`] and [`MemoCache::clear`]
//! evict explicitly.

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Key → shared handle registry.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: HashMap<K, Rc<V>>,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> MemoCache<K, V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached handle for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Rc<V>> {
        self.entries.get(key).cloned()
    }

    /// Return the cached handle for `key`, or build one with `make`, cache
    /// it, and return it.
    ///
    /// Unreferenced entries are pruned before a new one is inserted.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> Rc<V> {
        if let Some(existing) = self.entries.get(&key) {
            return Rc::clone(existing);
        }
        let pruned = self.prune_unused();
        if pruned > 0 {
            tracing::trace!(pruned, "memo cache pruned unused entries");
        }
        let handle = Rc::new(make());
        self.entries.insert(key, Rc::clone(&handle));
        handle
    }

    /// Drop every entry that nobody outside the cache references.
    ///
    /// Returns the number of evicted entries.
    pub fn prune_unused(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, v| Rc::strong_count(v) > 1);
        before - self.entries.len()
    }

    /// Evict `key`. Outstanding handles stay valid but are no longer shared
    /// with future requests.
    pub fn remove(&mut self, key: &K) -> Option<Rc<V>> {
        self.entries.remove(key)
    }

    /// Evict everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

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
    use std::cell::Cell;

    #[test]
    fn same_key_returns_same_handle() {
        let mut cache = MemoCache::new();
        let a = cache.get_or_insert_with("greeting", || 1);
        let b = cache.get_or_insert_with("greeting", || 2);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(*b, 1);
    }

    #[test]
    fn builder_runs_once_per_live_key() {
        let mut cache = MemoCache::new();
        let calls = Cell::new(0u32);
        let _a = cache.get_or_insert_with(1, || calls.set(calls.get() + 1));
        let _b = cache.get_or_insert_with(1, || calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn distinct_keys_distinct_handles() {
        let mut cache = MemoCache::new();
        let a = cache.get_or_insert_with("a", || 0);
        let b = cache.get_or_insert_with("b", || 0);
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unreferenced_entries_are_pruned_on_insert() {
        let mut cache = MemoCache::new();
        let held = cache.get_or_insert_with("held", || 0);
        drop(cache.get_or_insert_with("dropped", || 0));
        assert_eq!(cache.len(), 2);

        let _c = cache.get_or_insert_with("new", || 0);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&"dropped").is_none());
        assert!(Rc::ptr_eq(&held, &cache.get(&"held").unwrap()));
    }

    #[test]
    fn remove_and_clear() {
        let mut cache = MemoCache::new();
        let a = cache.get_or_insert_with("a", || 1);
        let _b = cache.get_or_insert_with("b", || 2);

        let removed = cache.remove(&"a").unwrap();
        assert!(Rc::ptr_eq(&a, &removed));
        let fresh = cache.get_or_insert_with("a", || 3);
        assert!(!Rc::ptr_eq(&a, &fresh));

        cache.clear();
        assert!(cache.is_empty());
    }
}
