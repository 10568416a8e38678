//! # Typed Value Storage
//!
//! Per-property storage of one element kind: a default value plus a sparse
//! map of per-element overrides. Lookups are total: any id that was never
//! written reads the default.
//!
//! The store knows nothing about graphs, events or undo; `Property` layers
//! those on top.

use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;

use crate::model::{EdgeId, NodeId};

/// Id type a `ValueStore` is keyed by.
pub trait ElementKey: Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl ElementKey for NodeId {}
impl ElementKey for EdgeId {}

// ============================================================================
// ValueStore
// ============================================================================

/// Default value + sparse overrides.
#[derive(Debug, Clone)]
pub struct ValueStore<K: ElementKey, T> {
    default: T,
    overrides: HashMap<K, T>,
    /// Drop an override as soon as it equals the default.
    prune: bool,
}

impl<K: ElementKey, T: Clone + PartialEq> ValueStore<K, T> {
    pub fn new(default: T) -> Self {
        Self::with_pruning(default, true)
    }

    pub fn with_pruning(default: T, prune: bool) -> Self {
        Self { default, overrides: HashMap::new(), prune }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Override if present, else the default.
    pub fn get(&self, id: K) -> &T {
        self.overrides.get(&id).unwrap_or(&self.default)
    }

    /// Value plus whether it was explicitly set.
    pub fn get_with_flag(&self, id: K) -> (&T, bool) {
        match self.overrides.get(&id) {
            Some(v) => (v, true),
            None => (&self.default, false),
        }
    }

    pub fn override_of(&self, id: K) -> Option<&T> {
        self.overrides.get(&id)
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Ids with an explicit override, sorted.
    pub fn non_default_keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.overrides.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn number_of_non_default_values(&self) -> usize {
        self.overrides.len()
    }

    pub fn has_non_default_values(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Overridden ids whose value equals `value`, sorted.
    ///
    /// Elements reading the default are not enumerable here; callers that
    /// know the element set handle `value == default` themselves.
    pub fn find_all(&self, value: &T) -> Vec<K> {
        let mut keys: Vec<K> = self
            .overrides
            .iter()
            .filter(|(_, v)| *v == value)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn overrides(&self) -> &HashMap<K, T> {
        &self.overrides
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Inserts or replaces the override of `id`. Returns the previous override.
    pub fn set(&mut self, id: K, value: T) -> Option<T> {
        if self.prune && value == self.default {
            self.overrides.remove(&id)
        } else {
            self.overrides.insert(id, value)
        }
    }

    /// Forgets the override of `id`; it reads the default again.
    pub fn remove(&mut self, id: K) -> Option<T> {
        self.overrides.remove(&id)
    }

    /// Replaces the default and clears every override.
    /// Returns the previous default and overrides.
    pub fn set_all(&mut self, value: T) -> (T, HashMap<K, T>) {
        let default = std::mem::replace(&mut self.default, value);
        (default, std::mem::take(&mut self.overrides))
    }

    /// Replaces the default, keeping every override as is (even one that now
    /// equals the default). Returns the previous default.
    pub fn set_default(&mut self, value: T) -> T {
        std::mem::replace(&mut self.default, value)
    }

    /// Sets or clears the raw override of `id`, bypassing pruning.
    pub fn put_entry(&mut self, id: K, value: Option<T>) {
        match value {
            Some(v) => {
                self.overrides.insert(id, v);
            }
            None => {
                self.overrides.remove(&id);
            }
        }
    }

    /// Puts back a state previously returned by `set_all`.
    pub fn restore(&mut self, default: T, overrides: HashMap<K, T>) {
        self.default = default;
        self.overrides = overrides;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_until_set() {
        let mut store: ValueStore<NodeId, f64> = ValueStore::new(0.0);
        assert_eq!(*store.get(NodeId(3)), 0.0);
        assert_eq!(*store.get(NodeId(u32::MAX)), 0.0);
        store.set(NodeId(3), 4.5);
        assert_eq!(*store.get(NodeId(3)), 4.5);
        assert_eq!(store.get_with_flag(NodeId(3)), (&4.5, true));
        assert_eq!(store.get_with_flag(NodeId(7)), (&0.0, false));
    }

    #[test]
    fn test_set_default_value_prunes() {
        let mut store: ValueStore<NodeId, i32> = ValueStore::new(1);
        store.set(NodeId(1), 5);
        assert_eq!(store.number_of_non_default_values(), 1);
        store.set(NodeId(1), 1);
        assert!(!store.has_non_default_values());
        assert_eq!(*store.get(NodeId(1)), 1);
    }

    #[test]
    fn test_no_pruning_keeps_entry() {
        let mut store: ValueStore<EdgeId, i32> = ValueStore::with_pruning(1, false);
        store.set(EdgeId(2), 1);
        assert_eq!(store.non_default_keys(), vec![EdgeId(2)]);
        assert_eq!(*store.get(EdgeId(2)), 1);
    }

    #[test]
    fn test_set_all_clears_overrides() {
        let mut store: ValueStore<NodeId, i32> = ValueStore::new(0);
        store.set(NodeId(1), 3);
        store.set(NodeId(2), 4);
        let (old_default, old) = store.set_all(5);
        assert_eq!(old_default, 0);
        assert_eq!(old.len(), 2);
        assert_eq!(*store.get(NodeId(1)), 5);
        assert_eq!(*store.default_value(), 5);
        assert!(!store.has_non_default_values());

        store.restore(old_default, old);
        assert_eq!(*store.get(NodeId(2)), 4);
        assert_eq!(*store.default_value(), 0);
    }

    #[test]
    fn test_set_default_keeps_overrides() {
        let mut store: ValueStore<NodeId, i32> = ValueStore::new(0);
        store.set(NodeId(1), 3);
        store.set(NodeId(2), 9);
        assert_eq!(store.set_default(9), 0);
        assert_eq!(*store.get(NodeId(1)), 3);
        assert_eq!(*store.get(NodeId(7)), 9);
        assert_eq!(store.non_default_keys(), vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_find_all_sorted() {
        let mut store: ValueStore<NodeId, i32> = ValueStore::new(0);
        for i in [5, 1, 3] {
            store.set(NodeId(i), 7);
        }
        store.set(NodeId(2), 8);
        assert_eq!(store.find_all(&7), vec![NodeId(1), NodeId(3), NodeId(5)]);
    }
}
