//! Keyed stores backing the schema snapshot and mapping caches.
//!
//! Callers inject a store instead of owning hidden state, so caches can be
//! shared between services, isolated per test, or replaced with another
//! backend. Every key has at most one writer at a time; independent keys do
//! not block each other.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use schemap_model::{FieldMapping, MappingKey, Schema};

/// Get/put storage keyed by `K`, with an atomic read-modify-write per key.
pub trait KeyedStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    fn put(&self, key: K, value: V);

    /// Runs `update` with exclusive access to the entry for `key`.
    ///
    /// The entry is `None` when the key has never been written. Writes to
    /// the same key from other callers wait until `update` returns.
    fn modify(&self, key: &K, update: &mut dyn FnMut(&mut Option<V>));
}

/// Last known schema per `source_id`.
pub type SnapshotStore = dyn KeyedStore<String, Schema>;

/// Current mapping set per `(source schema id, target schema id)`.
pub type MappingStore = dyn KeyedStore<MappingKey, Vec<FieldMapping>>;

type Slot<V> = Arc<Mutex<Option<V>>>;

/// Process-local store with one mutex per key.
pub struct InMemoryStore<K, V> {
    slots: RwLock<BTreeMap<K, Slot<V>>>,
}

impl<K: Ord, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys that have been touched.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord + Clone, V> InMemoryStore<K, V> {
    fn slot(&self, key: &K) -> Slot<V> {
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = slots.get(key) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

impl<K: Ord, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for InMemoryStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl<K, V> KeyedStore<K, V> for InMemoryStore<K, V>
where
    K: Ord + Clone + Send + Sync,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let slot = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            slots.get(key).map(Arc::clone)
        }?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        value.clone()
    }

    fn put(&self, key: K, value: V) {
        let slot = self.slot(&key);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn modify(&self, key: &K, update: &mut dyn FnMut(&mut Option<V>)) {
        let slot = self.slot(key);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut value);
    }
}
