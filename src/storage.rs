//! Binding storage for the container
//!
//! Uses DashMap for sharded concurrent access.

use crate::binding::Binding;
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::TypeId;
use std::sync::Arc;

/// Thread-safe storage for bindings, keyed by interface `TypeId`.
///
/// Bindings are handed out as `Arc`s so no shard guard is held while a
/// factory runs; factories re-enter the storage to resolve dependencies.
pub(crate) struct BindingStorage {
    bindings: DashMap<TypeId, Arc<Binding>, RandomState>,
}

impl BindingStorage {
    /// Create new empty storage with a small shard count.
    ///
    /// Default DashMap uses num_cpus * 4 shards which is overkill for
    /// typical containers with a few dozen bindings.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity, scaling shards with it.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let shard_amount = if capacity <= 16 {
            8
        } else if capacity <= 64 {
            16
        } else {
            32
        };
        Self {
            bindings: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                shard_amount,
            ),
        }
    }

    /// Insert a binding unless one already exists for `type_id`.
    ///
    /// Returns `true` if `make` ran and its binding was stored. The check and
    /// the insert happen under the same shard lock.
    #[inline]
    pub fn insert_if_absent(&self, type_id: TypeId, make: impl FnOnce() -> Binding) -> bool {
        match self.bindings.entry(type_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(make()));
                true
            }
        }
    }

    /// Get the binding for `type_id`, detached from the map.
    #[inline]
    pub fn get(&self, type_id: &TypeId) -> Option<Arc<Binding>> {
        self.bindings.get(type_id).map(|b| Arc::clone(b.value()))
    }

    #[inline]
    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.bindings.contains_key(type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get all registered type IDs
    pub fn type_ids(&self) -> Vec<TypeId> {
        self.bindings.iter().map(|r| *r.key()).collect()
    }

    /// Snapshot of every binding, for graph checks.
    pub fn snapshot(&self) -> Vec<(TypeId, Arc<Binding>)> {
        self.bindings
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect()
    }
}

impl Default for BindingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingStorage")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Component;

    struct First;
    struct Second;

    impl Component for First {
        type Dependencies = ();
        fn construct(_: ()) -> Self {
            First
        }
    }

    impl Component for Second {
        type Dependencies = ();
        fn construct(_: ()) -> Self {
            Second
        }
    }

    #[test]
    fn test_storage_insert_and_get() {
        let storage = BindingStorage::new();
        let type_id = TypeId::of::<First>();

        assert!(!storage.contains(&type_id));
        assert!(storage.insert_if_absent(type_id, Binding::new::<First, First>));
        assert!(storage.contains(&type_id));
        assert_eq!(storage.len(), 1);

        let binding = storage.get(&type_id).unwrap();
        assert!(binding.implementation.ends_with("First"));
    }

    #[test]
    fn test_storage_first_insert_wins() {
        let storage = BindingStorage::new();
        let type_id = TypeId::of::<First>();

        assert!(storage.insert_if_absent(type_id, Binding::new::<First, First>));
        assert!(!storage.insert_if_absent(type_id, || {
            panic!("factory for a taken key must not run")
        }));

        let binding = storage.get(&type_id).unwrap();
        assert!(binding.implementation.ends_with("First"));
    }

    #[test]
    fn test_storage_snapshot() {
        let storage = BindingStorage::with_capacity(100);
        storage.insert_if_absent(TypeId::of::<First>(), Binding::new::<First, First>);
        storage.insert_if_absent(TypeId::of::<Second>(), Binding::new::<Second, Second>);

        let mut ids = storage.type_ids();
        ids.sort();
        let mut snap: Vec<_> = storage.snapshot().into_iter().map(|(id, _)| id).collect();
        snap.sort();
        assert_eq!(ids, snap);
        assert_eq!(ids.len(), 2);
    }
}
