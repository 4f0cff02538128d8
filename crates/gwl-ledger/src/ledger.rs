//! The ledger facade.
//!
//! Lock tiers, outermost first:
//! 1. the map-structural mutex inside each [`SlotTable`](crate::locks),
//!    held only while a slot is looked up or pruned;
//! 2. the per-bucket slot lock;
//! 3. the per-upload-id slot lock.
//!
//! Only the public methods below acquire guards. Registry helpers receive
//! the locked slot contents, so they cannot run without the right lock held,
//! and every guard is released on drop regardless of how a method exits.
//! When both a bucket and an upload are locked, the bucket is always locked
//! first.
//!
//! Every mutation is prepared on a copy, written to the metadata store, and
//! only then committed to the cache. A failed or abandoned call therefore
//! never leaves the cache ahead of the store.

use bytes::Bytes;
use gwl_content::ContentBackend;
use gwl_store::{Key, MetadataStore, Namespaced};
use gwl_types::{BucketRecord, MultipartUpload, NodeDescriptor, ObjectInfo};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};
use tracing::{debug, info};

use crate::bucket::{BucketEntry, BucketRegistry};
use crate::config::LedgerConfig;
use crate::deadline::with_deadline;
use crate::error::{LedgerError, LedgerResult};
use crate::multipart::{UploadGuard, UploadRegistry};
use crate::names::{validate_bucket_name, validate_upload_id};

type BucketReadGuard = OwnedRwLockReadGuard<Option<BucketEntry>, BucketEntry>;
type BucketWriteGuard = OwnedRwLockWriteGuard<Option<BucketEntry>>;

/// Authoritative view of buckets, objects, and in-flight multipart uploads.
///
/// Records are cached on first read and kept until deleted. The cache is
/// unbounded for the lifetime of the ledger.
pub struct Ledger<S, C> {
    store: Namespaced<S>,
    content: C,
    config: LedgerConfig,
    buckets: BucketRegistry,
    uploads: UploadRegistry,
}

impl<S: MetadataStore, C: ContentBackend> Ledger<S, C> {
    pub fn new(store: S, content: C, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        let store = Namespaced::new(Key::new(&config.root_prefix), store);
        Ok(Self {
            store,
            content,
            buckets: BucketRegistry::new(Key::new(&config.bucket_prefix)),
            uploads: UploadRegistry::new(Key::new(&config.multipart_prefix)),
            config,
        })
    }

    pub fn with_defaults(store: S, content: C) -> LedgerResult<Self> {
        Self::new(store, content, LedgerConfig::default())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &Namespaced<S> {
        &self.store
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    // ---- Buckets ----

    /// Create an empty bucket.
    ///
    /// The name must be non-empty and free of `/`, else
    /// [`LedgerError::InvalidBucketName`].
    pub async fn create_bucket(&self, bucket: &str) -> LedgerResult<()> {
        self.insert_bucket(BucketRecord::new(bucket)).await
    }

    /// Create a bucket whose existing objects are listed by a backend node.
    ///
    /// The node is resolved lazily, on the first operation that needs the
    /// bucket's object map.
    pub async fn create_bucket_with_root(&self, bucket: &str, root: &str) -> LedgerResult<()> {
        self.insert_bucket(BucketRecord::with_root(bucket, root)).await
    }

    /// Delete an empty bucket.
    pub async fn delete_bucket(&self, bucket: &str) -> LedgerResult<()> {
        let mut guard = self.buckets.slots().write(bucket).await?;
        self.buckets.load(&self.store, bucket, &mut guard).await?;
        if guard.is_none() {
            drop(guard);
            self.buckets.slots().prune(bucket)?;
            return Err(LedgerError::BucketNotFound(bucket.to_string()));
        }
        let entry = loaded_entry(&mut guard, bucket)?;
        entry
            .ensure_cache(&self.content, self.config.backend_timeout())
            .await?;
        if !entry.record.objects.is_empty() {
            return Err(LedgerError::BucketNotEmpty(bucket.to_string()));
        }
        self.buckets.erase(&self.store, bucket).await?;
        *guard = None;
        drop(guard);
        self.buckets.slots().prune(bucket)?;
        info!(bucket, "bucket deleted");
        Ok(())
    }

    pub async fn bucket_exists(&self, bucket: &str) -> LedgerResult<bool> {
        match self.read_bucket(bucket, false).await {
            Ok(_) => Ok(true),
            Err(LedgerError::BucketNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Names of all buckets with a durable record, sorted.
    pub async fn bucket_names(&self) -> LedgerResult<Vec<String>> {
        self.buckets.durable_names(&self.store).await
    }

    /// Names of buckets currently held in the cache, sorted.
    pub fn cached_bucket_names(&self) -> LedgerResult<Vec<String>> {
        self.buckets.slots().cached_keys()
    }

    // ---- Objects ----

    /// Point `object` in `bucket` at `content_hash`, replacing any prior
    /// mapping, and persist the bucket record.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        content_hash: &str,
    ) -> LedgerResult<()> {
        let mut guard = self.write_bucket(bucket).await?;
        let entry = loaded_entry(&mut guard, bucket)?;

        let mut record = entry.record.clone();
        record
            .objects
            .insert(object.to_string(), content_hash.to_string());
        self.buckets.persist(&self.store, &record).await?;
        entry.record = record;
        debug!(bucket, object, content_hash, "object stored");
        Ok(())
    }

    /// Remove `object` from `bucket`. Removing an absent object succeeds.
    pub async fn remove_object(&self, bucket: &str, object: &str) -> LedgerResult<()> {
        let mut guard = self.write_bucket(bucket).await?;
        let entry = loaded_entry(&mut guard, bucket)?;

        let mut record = entry.record.clone();
        let removed = record.objects.remove(object);
        if removed.is_some() && self.config.persist_removals {
            self.buckets.persist(&self.store, &record).await?;
        }
        entry.record = record;
        // TODO: release the object's backend content once content garbage collection exists.
        debug!(bucket, object, existed = removed.is_some(), "object removed");
        Ok(())
    }

    /// Content hash `object` currently maps to.
    pub async fn get_object_hash(&self, bucket: &str, object: &str) -> LedgerResult<String> {
        let entry = self.read_bucket(bucket, true).await?;
        entry
            .record
            .object_hash(object)
            .map(str::to_string)
            .ok_or_else(|| LedgerError::ObjectNotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            })
    }

    /// All `(object name, content hash)` pairs in `bucket`, sorted by name.
    pub async fn list_objects(&self, bucket: &str) -> LedgerResult<Vec<(String, String)>> {
        let entry = self.read_bucket(bucket, true).await?;
        Ok(entry
            .record
            .objects
            .iter()
            .map(|(name, hash)| (name.clone(), hash.clone()))
            .collect())
    }

    /// Resolve the backend node of an object.
    ///
    /// The bucket lock is released before the backend is called.
    pub async fn get_object_node(&self, bucket: &str, object: &str) -> LedgerResult<NodeDescriptor> {
        let hash = self.get_object_hash(bucket, object).await?;
        with_deadline(
            "resolve_node",
            self.config.backend_timeout(),
            self.content.resolve_node(&hash),
        )
        .await
    }

    /// Fetch an object's payload from the content backend.
    pub async fn get_object_bytes(&self, bucket: &str, object: &str) -> LedgerResult<Bytes> {
        let node = self.get_object_node(bucket, object).await?;
        with_deadline(
            "fetch_bytes",
            self.config.backend_timeout(),
            self.content.fetch_bytes(&node.data_hash),
        )
        .await
    }

    // ---- Multipart uploads ----

    /// Start tracking an upload of `info.name` into `info.bucket`.
    ///
    /// The upload id is chosen by the caller. Starting an upload under an id
    /// that is already in use replaces the earlier upload.
    pub async fn new_multipart_upload(&self, upload_id: &str, info: ObjectInfo) -> LedgerResult<()> {
        validate_upload_id(upload_id)?;
        let _bucket = self.read_bucket(&info.bucket, false).await?;
        let mut slot = self.uploads.slots().write(upload_id).await?;

        let upload = MultipartUpload::new(upload_id, info);
        self.uploads.persist(&self.store, &upload).await?;
        info!(
            upload_id,
            bucket = %upload.object_info.bucket,
            object = %upload.object_info.name,
            "multipart upload started"
        );
        *slot = Some(upload);
        Ok(())
    }

    /// Record part `part_number` of an upload, replacing any earlier part
    /// with that number, and persist the whole upload record.
    ///
    /// Fails with [`LedgerError::InvalidUploadID`] if the upload does not
    /// exist or targets a different object.
    pub async fn put_object_part(
        &self,
        bucket: &str,
        object: &str,
        part_hash: &str,
        upload_id: &str,
        part_number: i64,
    ) -> LedgerResult<()> {
        let _bucket = self.read_bucket(bucket, false).await?;
        let mut slot = self.uploads.slots().write(upload_id).await?;
        let current = self
            .uploads
            .load_existing(&self.store, upload_id, &mut slot)
            .await?;
        if current.object_info.bucket != bucket || current.object_info.name != object {
            return Err(LedgerError::InvalidUploadID(upload_id.to_string()));
        }

        let mut upload = current.clone();
        upload.put_part(part_number, part_hash);
        self.uploads.persist(&self.store, &upload).await?;
        *current = upload;
        debug!(upload_id, part_number, part_hash, "part recorded");
        Ok(())
    }

    /// Abort an upload of an object in `bucket`.
    ///
    /// An upload that targets another bucket is reported as
    /// [`LedgerError::InvalidUploadID`] and left in place.
    pub async fn abort_multipart_upload(&self, bucket: &str, upload_id: &str) -> LedgerResult<()> {
        let _bucket = self.read_bucket(bucket, false).await?;
        let mut slot = self.uploads.slots().write(upload_id).await?;
        let result = self.abort_in_slot(bucket, upload_id, &mut slot).await;
        drop(slot);
        self.uploads.slots().prune(upload_id)?;
        result?;
        info!(upload_id, bucket, "multipart upload aborted");
        Ok(())
    }

    /// Forget an upload id, in memory and in the store.
    pub async fn delete_multipart_id(&self, upload_id: &str) -> LedgerResult<()> {
        let mut slot = self.uploads.slots().write(upload_id).await?;
        let result = self.uploads.delete(&self.store, upload_id, &mut slot).await;
        drop(slot);
        self.uploads.slots().prune(upload_id)?;
        result?;
        info!(upload_id, "multipart upload removed");
        Ok(())
    }

    /// Read an upload's record.
    ///
    /// The returned guard holds the upload's read lock. Writers to this
    /// upload wait until it is dropped, so release it as soon as reading is
    /// done.
    pub async fn get_object_details(&self, upload_id: &str) -> LedgerResult<UploadGuard> {
        let slots = self.uploads.slots();
        let slot = slots.slot(upload_id)?;

        let cached = slot.clone().read_owned().await;
        if let Ok(upload) = OwnedRwLockReadGuard::try_map(cached, Option::as_ref) {
            debug!(upload_id, "upload cache hit");
            return Ok(UploadGuard::new(upload));
        }

        let mut guard = slot.write_owned().await;
        self.uploads.load(&self.store, upload_id, &mut guard).await?;
        match OwnedRwLockReadGuard::try_map(guard.downgrade(), Option::as_ref) {
            Ok(upload) => Ok(UploadGuard::new(upload)),
            Err(empty) => {
                drop(empty);
                slots.prune(upload_id)?;
                Err(LedgerError::InvalidUploadID(upload_id.to_string()))
            }
        }
    }

    /// `Ok(())` if the upload exists, [`LedgerError::InvalidUploadID`] if not.
    pub async fn multipart_id_exists(&self, upload_id: &str) -> LedgerResult<()> {
        self.get_object_details(upload_id).await.map(UploadGuard::release)
    }

    /// Hashes of an upload's parts in ascending part-number order.
    pub async fn multipart_part_hashes(
        &self,
        bucket: &str,
        upload_id: &str,
    ) -> LedgerResult<Vec<String>> {
        let _bucket = self.read_bucket(bucket, false).await?;
        let upload = self.get_object_details(upload_id).await?;
        if upload.object_info.bucket != bucket {
            return Err(LedgerError::InvalidUploadID(upload_id.to_string()));
        }
        Ok(upload.part_hashes())
    }

    /// Upload ids currently held in the cache, sorted.
    pub fn cached_upload_ids(&self) -> LedgerResult<Vec<String>> {
        self.uploads.slots().cached_keys()
    }

    // ---- Lock acquisition ----

    async fn abort_in_slot(
        &self,
        bucket: &str,
        upload_id: &str,
        slot: &mut Option<MultipartUpload>,
    ) -> LedgerResult<()> {
        let current = self.uploads.load_existing(&self.store, upload_id, slot).await?;
        if current.object_info.bucket != bucket {
            return Err(LedgerError::InvalidUploadID(upload_id.to_string()));
        }
        self.uploads.delete(&self.store, upload_id, slot).await
    }

    async fn insert_bucket(&self, record: BucketRecord) -> LedgerResult<()> {
        validate_bucket_name(&record.name)?;
        let name = record.name.clone();
        let mut guard = self.buckets.slots().write(&name).await?;
        self.buckets.load(&self.store, &name, &mut guard).await?;
        if guard.is_some() {
            return Err(LedgerError::BucketExists(name));
        }
        self.buckets.persist(&self.store, &record).await?;
        *guard = Some(BucketEntry::new(record));
        info!(bucket = %name, "bucket created");
        Ok(())
    }

    /// Shared lock on a bucket, loading it first if needed. With
    /// `need_objects`, the object map is also synchronized with the backend.
    async fn read_bucket(&self, bucket: &str, need_objects: bool) -> LedgerResult<BucketReadGuard> {
        let slots = self.buckets.slots();
        let slot = slots.slot(bucket)?;

        let cached = slot.clone().read_owned().await;
        if let Ok(entry) = OwnedRwLockReadGuard::try_map(cached, |s| {
            s.as_ref().filter(|e| e.loaded || !need_objects)
        }) {
            debug!(bucket, "bucket cache hit");
            return Ok(entry);
        }

        let mut guard = slot.write_owned().await;
        self.buckets.load(&self.store, bucket, &mut guard).await?;
        if guard.is_none() {
            drop(guard);
            slots.prune(bucket)?;
            return Err(LedgerError::BucketNotFound(bucket.to_string()));
        }
        if need_objects {
            loaded_entry(&mut guard, bucket)?
                .ensure_cache(&self.content, self.config.backend_timeout())
                .await?;
        }
        OwnedRwLockReadGuard::try_map(guard.downgrade(), Option::as_ref)
            .map_err(|_| LedgerError::BucketNotFound(bucket.to_string()))
    }

    /// Exclusive lock on a bucket whose object map is loaded.
    async fn write_bucket(&self, bucket: &str) -> LedgerResult<BucketWriteGuard> {
        let mut guard = self.buckets.slots().write(bucket).await?;
        self.buckets.load(&self.store, bucket, &mut guard).await?;
        if guard.is_none() {
            drop(guard);
            self.buckets.slots().prune(bucket)?;
            return Err(LedgerError::BucketNotFound(bucket.to_string()));
        }
        loaded_entry(&mut guard, bucket)?
            .ensure_cache(&self.content, self.config.backend_timeout())
            .await?;
        Ok(guard)
    }
}

fn loaded_entry<'a>(
    guard: &'a mut BucketWriteGuard,
    bucket: &str,
) -> LedgerResult<&'a mut BucketEntry> {
    guard
        .as_mut()
        .ok_or_else(|| LedgerError::BucketNotFound(bucket.to_string()))
}

impl<S, C> std::fmt::Debug for Ledger<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("root_prefix", &self.config.root_prefix)
            .field("cached_buckets", &self.buckets.slots().slot_count())
            .field("cached_uploads", &self.uploads.slots().slot_count())
            .finish()
    }
}
