//! Bucket registry: bucket name -> (durable record, loaded flag).
//!
//! Nothing in here takes a lock. Every helper works on an entry or slot the
//! caller has already locked through [`BucketRegistry::slots`].

use std::time::Duration;

use gwl_content::ContentBackend;
use gwl_store::{Key, MetadataStore};
use gwl_types::{BucketRecord, Record};
use tracing::{debug, warn};

use crate::deadline::with_deadline;
use crate::error::LedgerResult;
use crate::locks::SlotTable;

/// A cached bucket.
///
/// `loaded` turns true once the object map reflects the content backend.
/// Buckets without a backend root are loaded from the start.
#[derive(Debug, Clone)]
pub(crate) struct BucketEntry {
    pub(crate) record: BucketRecord,
    pub(crate) loaded: bool,
}

impl BucketEntry {
    pub(crate) fn new(record: BucketRecord) -> Self {
        let loaded = record.root.is_none();
        Self { record, loaded }
    }

    /// Populate the object map from the content backend, once.
    ///
    /// The root node's links form the baseline and durable entries are
    /// layered on top. The root is then folded away so a later persist
    /// writes the full map and a removed object cannot reappear from the
    /// root on the next load. Nothing is modified if the backend call fails.
    pub(crate) async fn ensure_cache<C: ContentBackend>(
        &mut self,
        content: &C,
        timeout: Option<Duration>,
    ) -> LedgerResult<()> {
        if self.loaded {
            return Ok(());
        }
        if let Some(root) = self.record.root.as_deref() {
            let node = with_deadline("resolve_node", timeout, content.resolve_node(root)).await?;
            let mut objects = node.links;
            objects.extend(
                self.record
                    .objects
                    .iter()
                    .map(|(name, hash)| (name.clone(), hash.clone())),
            );
            debug!(bucket = %self.record.name, objects = objects.len(), "bucket cache loaded");
            self.record.objects = objects;
            self.record.root = None;
        }
        self.loaded = true;
        Ok(())
    }
}

pub(crate) struct BucketRegistry {
    slots: SlotTable<BucketEntry>,
    prefix: Key,
}

impl BucketRegistry {
    pub(crate) fn new(prefix: Key) -> Self {
        Self {
            slots: SlotTable::new(),
            prefix,
        }
    }

    pub(crate) fn slots(&self) -> &SlotTable<BucketEntry> {
        &self.slots
    }

    pub(crate) fn key(&self, name: &str) -> Key {
        self.prefix.child(name)
    }

    /// Fill an empty slot from the metadata store. A missing record leaves
    /// the slot empty; that is not an error.
    pub(crate) async fn load<S: MetadataStore>(
        &self,
        store: &S,
        name: &str,
        slot: &mut Option<BucketEntry>,
    ) -> LedgerResult<()> {
        if slot.is_some() {
            return Ok(());
        }
        let Some(bytes) = store.get(&self.key(name)).await? else {
            debug!(bucket = name, "bucket record absent");
            return Ok(());
        };
        let record = BucketRecord::decode(&bytes)?;
        debug!(bucket = name, "bucket record read from store");
        *slot = Some(BucketEntry::new(record));
        Ok(())
    }

    pub(crate) async fn persist<S: MetadataStore>(
        &self,
        store: &S,
        record: &BucketRecord,
    ) -> LedgerResult<()> {
        store
            .put(&self.key(&record.name), record.encode()?)
            .await
            .inspect_err(|e| warn!(bucket = %record.name, error = %e, "bucket record write failed"))?;
        Ok(())
    }

    pub(crate) async fn erase<S: MetadataStore>(&self, store: &S, name: &str) -> LedgerResult<bool> {
        Ok(store.delete(&self.key(name)).await?)
    }

    /// Names of every bucket with a durable record, sorted.
    pub(crate) async fn durable_names<S: MetadataStore>(&self, store: &S) -> LedgerResult<Vec<String>> {
        let keys = store.keys(&self.prefix).await?;
        Ok(keys.iter().map(|k| k.name().to_string()).collect())
    }
}
