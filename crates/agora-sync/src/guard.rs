//! Per-key in-flight guards.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// Set of keys with an operation in flight.
///
/// At most one [`InFlightPermit`] exists per key; the key is released when
/// the permit drops, including when the owning future is cancelled.
#[derive(Debug)]
pub struct InFlight<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K> Clone for InFlight<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<K: Eq + Hash + Clone> Default for InFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim `key`, or `None` if it is already claimed.
    pub fn try_acquire(&self, key: &K) -> Option<InFlightPermit<K>> {
        if !self.keys.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightPermit {
            keys: Arc::clone(&self.keys),
            key: key.clone(),
        })
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.keys.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}

/// Proof that a key is claimed.
#[derive(Debug)]
pub struct InFlightPermit<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash> InFlightPermit<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash> Drop for InFlightPermit<K> {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_permit_per_key() {
        let guard = InFlight::new();
        let first = guard.try_acquire(&"p1").unwrap();
        assert!(guard.try_acquire(&"p1").is_none());
        assert!(guard.try_acquire(&"p2").is_some());
        assert!(guard.is_in_flight(&"p1"));

        drop(first);
        assert!(!guard.is_in_flight(&"p1"));
        assert!(guard.try_acquire(&"p1").is_some());
    }

    #[test]
    fn clones_share_keys() {
        let guard = InFlight::new();
        let other = guard.clone();
        let _permit = guard.try_acquire(&1u32).unwrap();
        assert!(other.try_acquire(&1u32).is_none());
        assert_eq!(other.len(), 1);
    }
}
