//! Multipart upload registry: upload id -> in-flight upload.
//!
//! Like the bucket registry, these helpers never lock; callers pass in the
//! contents of a slot they already hold.

use std::ops::Deref;

use gwl_store::{Key, MetadataStore};
use gwl_types::{MultipartUpload, Record};
use tokio::sync::OwnedRwLockReadGuard;
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::locks::SlotTable;

pub(crate) struct UploadRegistry {
    slots: SlotTable<MultipartUpload>,
    prefix: Key,
}

impl UploadRegistry {
    pub(crate) fn new(prefix: Key) -> Self {
        Self {
            slots: SlotTable::new(),
            prefix,
        }
    }

    pub(crate) fn slots(&self) -> &SlotTable<MultipartUpload> {
        &self.slots
    }

    pub(crate) fn key(&self, upload_id: &str) -> Key {
        self.prefix.child(upload_id)
    }

    /// Fill an empty slot from the metadata store.
    ///
    /// A record that is not in the store leaves the slot empty with no
    /// error; the caller decides what absence means. A record found in the
    /// store stays cached in the slot until the upload is deleted.
    pub(crate) async fn load<S: MetadataStore>(
        &self,
        store: &S,
        upload_id: &str,
        slot: &mut Option<MultipartUpload>,
    ) -> LedgerResult<()> {
        if slot.is_some() {
            return Ok(());
        }
        let Some(bytes) = store.get(&self.key(upload_id)).await? else {
            return Ok(());
        };
        let upload = MultipartUpload::decode(&bytes)?;
        debug!(upload_id, parts = upload.parts.len(), "upload record read from store");
        *slot = Some(upload);
        Ok(())
    }

    /// Like [`UploadRegistry::load`], but absence is [`LedgerError::InvalidUploadID`].
    pub(crate) async fn load_existing<'a, S: MetadataStore>(
        &self,
        store: &S,
        upload_id: &str,
        slot: &'a mut Option<MultipartUpload>,
    ) -> LedgerResult<&'a mut MultipartUpload> {
        self.load(store, upload_id, slot).await?;
        slot.as_mut()
            .ok_or_else(|| LedgerError::InvalidUploadID(upload_id.to_string()))
    }

    pub(crate) async fn persist<S: MetadataStore>(
        &self,
        store: &S,
        upload: &MultipartUpload,
    ) -> LedgerResult<()> {
        store
            .put(&self.key(&upload.id), upload.encode()?)
            .await
            .inspect_err(|e| warn!(upload_id = %upload.id, error = %e, "upload record write failed"))?;
        Ok(())
    }

    /// Remove the durable record and clear the slot.
    ///
    /// Fails with [`LedgerError::InvalidUploadID`] if the upload was neither
    /// cached nor stored.
    pub(crate) async fn delete<S: MetadataStore>(
        &self,
        store: &S,
        upload_id: &str,
        slot: &mut Option<MultipartUpload>,
    ) -> LedgerResult<()> {
        let stored = store.delete(&self.key(upload_id)).await?;
        let cached = slot.take().is_some();
        if !stored && !cached {
            return Err(LedgerError::InvalidUploadID(upload_id.to_string()));
        }
        Ok(())
    }
}

/// Shared read access to an upload, returned by
/// [`crate::Ledger::get_object_details`].
///
/// Writers to the same upload id wait until this guard is dropped or
/// [`UploadGuard::release`] is called. Do not keep it across unrelated work.
pub struct UploadGuard {
    inner: OwnedRwLockReadGuard<Option<MultipartUpload>, MultipartUpload>,
}

impl UploadGuard {
    pub(crate) fn new(inner: OwnedRwLockReadGuard<Option<MultipartUpload>, MultipartUpload>) -> Self {
        Self { inner }
    }

    /// Release the read lock.
    pub fn release(self) {}
}

impl Deref for UploadGuard {
    type Target = MultipartUpload;

    fn deref(&self) -> &MultipartUpload {
        &self.inner
    }
}

impl std::fmt::Debug for UploadGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UploadGuard").field(&self.inner.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwl_store::InMemoryMetadataStore;
    use gwl_types::ObjectInfo;

    fn registry() -> UploadRegistry {
        UploadRegistry::new(Key::new("/p"))
    }

    #[tokio::test]
    async fn absent_record_is_not_an_error() {
        let store = InMemoryMetadataStore::new();
        let mut slot = None;
        registry().load(&store, "u1", &mut slot).await.unwrap();
        assert!(slot.is_none());
    }

    #[tokio::test]
    async fn load_existing_maps_absence_to_invalid_upload() {
        let store = InMemoryMetadataStore::new();
        let mut slot = None;
        let err = registry()
            .load_existing(&store, "u1", &mut slot)
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidUploadID("u1".into()));
    }

    #[tokio::test]
    async fn persisted_upload_loads_back() {
        let store = InMemoryMetadataStore::new();
        let reg = registry();
        let mut upload = MultipartUpload::new("u1", ObjectInfo::new("b1", "o1"));
        upload.put_part(1, "hashA");
        reg.persist(&store, &upload).await.unwrap();

        let mut slot = None;
        let loaded = reg.load_existing(&store, "u1", &mut slot).await.unwrap();
        assert_eq!(loaded, &upload);
    }

    #[tokio::test]
    async fn delete_twice_reports_invalid_upload() {
        let store = InMemoryMetadataStore::new();
        let reg = registry();
        reg.persist(&store, &MultipartUpload::new("u1", ObjectInfo::new("b1", "o1")))
            .await
            .unwrap();

        let mut slot = None;
        reg.load(&store, "u1", &mut slot).await.unwrap();
        reg.delete(&store, "u1", &mut slot).await.unwrap();
        assert!(slot.is_none());
        assert_eq!(
            reg.delete(&store, "u1", &mut slot).await.unwrap_err(),
            LedgerError::InvalidUploadID("u1".into())
        );
    }

    #[tokio::test]
    async fn corrupt_record_fails_with_codec_error() {
        let store = InMemoryMetadataStore::new();
        let reg = registry();
        store.put(&reg.key("u1"), b"not a record".to_vec()).await.unwrap();

        let mut slot = None;
        let err = reg.load(&store, "u1", &mut slot).await.unwrap_err();
        assert!(matches!(err, LedgerError::Codec(_)));
    }
}
