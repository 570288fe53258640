use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

/// A map safe for concurrent use by many readers and writers.
///
/// Every method takes the lock for exactly one map operation and releases it
/// before returning, so no caller ever observes a half-written entry and the
/// lock is never held while caller code runs. Values are returned by clone;
/// store `Arc`s when cloning the value itself is expensive.
pub struct SyncMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> SyncMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the value for `key`, or `V::default()` when absent.
    ///
    /// Use [`get_check`](Self::get_check) to tell an absent key from one
    /// holding the default value.
    pub fn get<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone + Default,
    {
        self.get_check(key).unwrap_or_default()
    }

    /// Returns the value for `key`, or `None` when absent.
    pub fn get_check<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Inserts or replaces the entry for `key`.
    pub fn set(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    /// Removes the entry for `key`, returning it if it was present.
    /// Deleting an absent key is a no-op.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(key)
    }

    /// Copy of the keys present at the time of the call, in no particular order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.read().keys().cloned().collect()
    }

    /// Copy of the values present at the time of the call, in no particular order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<K, V> Default for SyncMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SyncMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMap")
            .field("len", &self.inner.read().len())
            .finish()
    }
}
