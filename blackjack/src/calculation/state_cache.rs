use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};

/// Memoization table shared between threads.
///
/// The lock is only held while the map itself is accessed. Callers look a key up,
/// compute the value without holding any lock (possibly recursing into the same
/// table), and then insert it. Two threads missing on the same key may both
/// compute it; the values are identical, so the later insert is harmless.
#[derive(Debug)]
pub struct StateCache<K, V> {
    data: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for StateCache<K, V> {
    fn default() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> StateCache<K, V> {
    pub fn get(&self, key: &K) -> Option<V> {
        // Entries are inserted whole, so a panic in another holder cannot leave a
        // partial value behind.
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
