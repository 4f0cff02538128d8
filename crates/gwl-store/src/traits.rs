use async_trait::async_trait;

use crate::error::StoreResult;
use crate::key::Key;

/// Durable key-value store holding ledger records.
///
/// All implementations must satisfy these invariants:
/// - A key that was never written (or was deleted) reads as `Ok(None)`.
///   `Err` is reserved for genuine backend failures.
/// - `put` is last-writer-wins; no compare-and-swap is implied.
/// - The store never interprets values.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if the key existed.
    async fn delete(&self, key: &Key) -> StoreResult<bool>;

    /// Check whether `key` holds a value.
    async fn has(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// List all keys strictly below `prefix`, sorted.
    async fn keys(&self, prefix: &Key) -> StoreResult<Vec<Key>>;

    /// Write several entries.
    ///
    /// The default implementation calls `put()` for each entry. Backends
    /// with a native batch primitive should override it.
    async fn put_batch(&self, entries: Vec<(Key, Vec<u8>)>) -> StoreResult<()> {
        for (key, value) in entries {
            self.put(&key, value).await?;
        }
        Ok(())
    }

    /// Delete several keys, returning how many existed.
    async fn delete_batch(&self, keys: &[Key]) -> StoreResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl<T: MetadataStore + ?Sized> MetadataStore for std::sync::Arc<T> {
    async fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, value).await
    }

    async fn delete(&self, key: &Key) -> StoreResult<bool> {
        (**self).delete(key).await
    }

    async fn has(&self, key: &Key) -> StoreResult<bool> {
        (**self).has(key).await
    }

    async fn keys(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        (**self).keys(prefix).await
    }

    async fn put_batch(&self, entries: Vec<(Key, Vec<u8>)>) -> StoreResult<()> {
        (**self).put_batch(entries).await
    }

    async fn delete_batch(&self, keys: &[Key]) -> StoreResult<usize> {
        (**self).delete_batch(keys).await
    }
}
