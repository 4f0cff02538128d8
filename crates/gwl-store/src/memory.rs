use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::traits::MetadataStore;

/// In-memory metadata store.
///
/// Intended for tests and embedding. Entries are held in a `BTreeMap`
/// behind a `RwLock`; values are cloned on read and write. Data is lost
/// when the store is dropped.
pub struct InMemoryMetadataStore {
    entries: RwLock<BTreeMap<Key, Vec<u8>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()> {
        if key.is_root() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &Key) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.remove(key).is_some())
    }

    async fn keys(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map
            .keys()
            .filter(|k| k.is_descendant_of(prefix))
            .cloned()
            .collect())
    }

    async fn put_batch(&self, entries: Vec<(Key, Vec<u8>)>) -> StoreResult<()> {
        if let Some((key, _)) = entries.iter().find(|(k, _)| k.is_root()) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.extend(entries);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMetadataStore")
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryMetadataStore::new();
        let key = Key::new("/b/photos");
        store.put(&key, b"record".to_vec()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(b"record".to_vec()));
        assert!(store.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn missing_key_is_none_not_error() {
        let store = InMemoryMetadataStore::new();
        assert_eq!(store.get(&Key::new("/never")).await.unwrap(), None);
        assert!(!store.has(&Key::new("/never")).await.unwrap());
    }

    #[tokio::test]
    async fn put_is_last_writer_wins() {
        let store = InMemoryMetadataStore::new();
        let key = Key::new("/k");
        store.put(&key, b"one".to_vec()).await.unwrap();
        store.put(&key, b"two".to_vec()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = InMemoryMetadataStore::new();
        let key = Key::new("/k");
        store.put(&key, vec![1]).await.unwrap();
        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn keys_lists_descendants_sorted() {
        let store = InMemoryMetadataStore::new();
        for k in ["/p/u2", "/p/u1", "/b/x", "/px/u3"] {
            store.put(&Key::new(k), vec![]).await.unwrap();
        }
        let keys = store.keys(&Key::new("/p")).await.unwrap();
        assert_eq!(keys, vec![Key::new("/p/u1"), Key::new("/p/u2")]);
    }

    #[tokio::test]
    async fn batch_put_and_delete() {
        let store = InMemoryMetadataStore::new();
        store
            .put_batch(vec![(Key::new("/a"), vec![1]), (Key::new("/b"), vec![2])])
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
        let removed = store
            .delete_batch(&[Key::new("/a"), Key::new("/missing")])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn root_key_is_rejected() {
        let store = InMemoryMetadataStore::new();
        let err = store.put(&Key::root(), vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
