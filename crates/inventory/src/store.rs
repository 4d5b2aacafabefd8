//! Persistence port for inventories.

use std::sync::Mutex;

use thiserror::Error;

use crate::inventory::InventoryEntry;
use crate::snapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("inventory snapshot is invalid: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Storage failed due to internal lock poisoning.
    #[error("inventory store lock poisoned")]
    Poisoned,
}

/// Durable home of an inventory across restarts.
pub trait InventoryStore: Send + Sync {
    /// Stored entries, or an empty list if nothing was saved yet.
    fn load(&self) -> Result<Vec<InventoryEntry>, StoreError>;

    fn save(&self, entries: &[InventoryEntry]) -> Result<(), StoreError>;

    /// Forget the stored inventory entirely.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Keeps a single JSON snapshot in memory, like a browser storage slot.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    slot: Mutex<Option<String>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-stored raw snapshot.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn load(&self) -> Result<Vec<InventoryEntry>, StoreError> {
        let slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        match slot.as_deref() {
            Some(raw) => snapshot::decode(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[InventoryEntry]) -> Result<(), StoreError> {
        let encoded = snapshot::encode(entries)?;
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

impl<S: InventoryStore + ?Sized> InventoryStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Vec<InventoryEntry>, StoreError> {
        (**self).load()
    }

    fn save(&self, entries: &[InventoryEntry]) -> Result<(), StoreError> {
        (**self).save(entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
