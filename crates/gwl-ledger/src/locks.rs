//! Keyed lock table backing both registries.
//!
//! Each key (bucket name or upload id) owns a slot: an `Arc<RwLock<Option<T>>>`
//! holding the cached entry, or `None` when nothing is cached. The table
//! itself sits behind a short-lived `Mutex` (the map-structural lock) that is
//! held only while a slot is looked up, inserted or removed, never across
//! I/O. Per-key work happens under the slot's own async lock, so unrelated
//! keys never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{LedgerError, LedgerResult};

pub(crate) type Slot<T> = Arc<RwLock<Option<T>>>;
pub(crate) type SlotWriteGuard<T> = OwnedRwLockWriteGuard<Option<T>>;

pub(crate) struct SlotTable<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> SlotTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The slot for `key`, created empty if absent.
    pub(crate) fn slot(&self, key: &str) -> LedgerResult<Slot<T>> {
        let mut slots = self.slots.lock().map_err(|_| LedgerError::LockPoisoned)?;
        let slot = slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(None)));
        Ok(Arc::clone(slot))
    }

    pub(crate) async fn write(&self, key: &str) -> LedgerResult<SlotWriteGuard<T>> {
        Ok(self.slot(key)?.write_owned().await)
    }

    /// Drop the slot for `key` if it is empty and nobody else holds it.
    ///
    /// Must be called after the caller's own guard has been released.
    pub(crate) fn prune(&self, key: &str) -> LedgerResult<()> {
        let mut slots = self.slots.lock().map_err(|_| LedgerError::LockPoisoned)?;
        let idle_and_empty = slots.get(key).is_some_and(|slot| {
            Arc::strong_count(slot) == 1
                && slot.try_read().map(|entry| entry.is_none()).unwrap_or(false)
        });
        if idle_and_empty {
            slots.remove(key);
        }
        Ok(())
    }

    /// Keys whose slot currently holds a cached entry, sorted.
    ///
    /// Slots busy with a writer are skipped.
    pub(crate) fn cached_keys(&self) -> LedgerResult<Vec<String>> {
        let slots = self.slots.lock().map_err(|_| LedgerError::LockPoisoned)?;
        let mut keys: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.try_read().map(|e| e.is_some()).unwrap_or(false))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}
