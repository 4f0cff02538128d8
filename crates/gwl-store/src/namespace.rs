use async_trait::async_trait;
use tracing::trace;

use crate::error::StoreResult;
use crate::key::Key;
use crate::traits::MetadataStore;

/// A store view that places every key below a fixed prefix.
///
/// Keys passed in are relative to the prefix; keys returned by
/// [`MetadataStore::keys`] are relative again, so callers never see the
/// prefix.
pub struct Namespaced<S> {
    prefix: Key,
    inner: S,
}

impl<S: MetadataStore> Namespaced<S> {
    pub fn new(prefix: Key, inner: S) -> Self {
        Self { prefix, inner }
    }

    pub fn prefix(&self) -> &Key {
        &self.prefix
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn outer(&self, key: &Key) -> Key {
        self.prefix.join(key)
    }

    fn relative(&self, key: &Key) -> Key {
        Key::new(
            key.as_str()
                .strip_prefix(self.prefix.as_str())
                .unwrap_or(key.as_str()),
        )
    }
}

#[async_trait]
impl<S: MetadataStore> MetadataStore for Namespaced<S> {
    async fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        let key = self.outer(key);
        trace!(%key, "metadata get");
        self.inner.get(&key).await
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()> {
        let key = self.outer(key);
        trace!(%key, len = value.len(), "metadata put");
        self.inner.put(&key, value).await
    }

    async fn delete(&self, key: &Key) -> StoreResult<bool> {
        let key = self.outer(key);
        trace!(%key, "metadata delete");
        self.inner.delete(&key).await
    }

    async fn has(&self, key: &Key) -> StoreResult<bool> {
        self.inner.has(&self.outer(key)).await
    }

    async fn keys(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        let keys = self.inner.keys(&self.outer(prefix)).await?;
        Ok(keys.iter().map(|k| self.relative(k)).collect())
    }

    async fn put_batch(&self, entries: Vec<(Key, Vec<u8>)>) -> StoreResult<()> {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (self.outer(&k), v))
            .collect();
        self.inner.put_batch(entries).await
    }

    async fn delete_batch(&self, keys: &[Key]) -> StoreResult<usize> {
        let keys: Vec<Key> = keys.iter().map(|k| self.outer(k)).collect();
        self.inner.delete_batch(&keys).await
    }
}
