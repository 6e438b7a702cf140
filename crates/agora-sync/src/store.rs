//! Ordered single-writer caches.
//!
//! A [`Store`] is owned by exactly one repository, which is the only code
//! that can write to it. Everyone else gets a [`StoreReader`]. Every write
//! publishes a fresh immutable `Arc<Vec<V>>`, so a reader never observes a
//! half-applied replacement.

use std::hash::Hash;
use std::sync::Arc;

use agora_types::{ChatChannel, ChannelId, Community, CommunityId, Report, ReportId};
use tokio::sync::watch;

/// An item that can live in a [`Store`].
pub trait Keyed {
    type Key: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static;

    fn key(&self) -> &Self::Key;
}

/// The write side of a cache.
pub struct Store<V> {
    tx: watch::Sender<Arc<Vec<V>>>,
}

impl<V: Keyed + Clone> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Keyed + Clone> Store<V> {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(Arc::new(Vec::new())),
        }
    }

    /// Replace the whole contents in one publish.
    pub fn replace_all(&self, items: Vec<V>) {
        self.tx.send_replace(Arc::new(items));
    }

    /// Replace the item with the same key in place, or append it.
    pub fn upsert(&self, item: V) {
        self.tx.send_modify(|items| {
            let items = Arc::make_mut(items);
            match items.iter().position(|existing| existing.key() == item.key()) {
                Some(index) => items[index] = item,
                None => items.push(item),
            }
        });
    }

    /// Remove by key. Returns whether anything was removed.
    pub fn remove(&self, key: &V::Key) -> bool {
        let mut removed = false;
        self.tx.send_if_modified(|items| {
            if let Some(index) = items.iter().position(|item| item.key() == key) {
                Arc::make_mut(items).remove(index);
                removed = true;
            }
            removed
        });
        removed
    }

    pub fn clear(&self) {
        self.tx.send_replace(Arc::new(Vec::new()));
    }

    pub fn get(&self, key: &V::Key) -> Option<V> {
        self.tx.borrow().iter().find(|item| item.key() == key).cloned()
    }

    pub fn snapshot(&self) -> Arc<Vec<V>> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Read-only handle for consumers.
    pub fn reader(&self) -> StoreReader<V> {
        StoreReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// The read side of a cache.
pub struct StoreReader<V> {
    rx: watch::Receiver<Arc<Vec<V>>>,
}

impl<V> Clone for StoreReader<V> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<V: Keyed + Clone> StoreReader<V> {
    pub fn snapshot(&self) -> Arc<Vec<V>> {
        Arc::clone(&self.rx.borrow())
    }

    pub fn get(&self, key: &V::Key) -> Option<V> {
        self.rx.borrow().iter().find(|item| item.key() == key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }

    /// Wait for the next write. Returns `false` once the owning store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Latest contents, marking them as seen.
    pub fn latest(&mut self) -> Arc<Vec<V>> {
        Arc::clone(&self.rx.borrow_and_update())
    }
}

impl Keyed for ChatChannel {
    type Key = ChannelId;

    fn key(&self) -> &ChannelId {
        &self.id
    }
}

impl Keyed for Community {
    type Key = CommunityId;

    fn key(&self) -> &CommunityId {
        &self.id
    }
}

impl Keyed for Report {
    type Key = ReportId;

    fn key(&self) -> &ReportId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Keyed for Item {
        type Key = String;

        fn key(&self) -> &String {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn upsert_replaces_in_place_and_appends() {
        let store = Store::new();
        store.replace_all(vec![item("a", 1), item("b", 2)]);

        store.upsert(item("a", 10));
        store.upsert(item("c", 3));

        let values: Vec<_> = store.snapshot().iter().map(|i| (i.id.clone(), i.value)).collect();
        assert_eq!(
            values,
            vec![
                ("a".to_string(), 10),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
    }

    #[test]
    fn snapshots_are_immutable() {
        let store = Store::new();
        store.replace_all(vec![item("a", 1)]);
        let before = store.snapshot();

        store.upsert(item("a", 2));
        assert_eq!(before[0].value, 1);
        assert_eq!(store.get(&"a".to_string()).unwrap().value, 2);
    }

    #[test]
    fn remove_and_clear() {
        let store = Store::new();
        store.replace_all(vec![item("a", 1), item("b", 2)]);

        assert!(store.remove(&"a".to_string()));
        assert!(!store.remove(&"a".to_string()));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn reader_observes_replacement_as_one_value() {
        let store = Store::new();
        let mut reader = store.reader();
        assert!(reader.is_empty());

        store.replace_all(vec![item("a", 1), item("b", 2)]);
        assert!(reader.changed().await);
        assert_eq!(reader.latest().len(), 2);
        assert_eq!(reader.get(&"b".to_string()), Some(item("b", 2)));

        drop(store);
        assert!(!reader.changed().await);
    }
}
