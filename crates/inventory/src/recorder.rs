//! Turns `ItemWon` events into inventory updates.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use skinvault_core::{Aggregate, DomainError, InventoryId, ItemId};
use skinvault_reveal::RevealEvent;

use crate::inventory::{
    ClearInventory, Inventory, InventoryCommand, InventoryEvent, RecordWin, RemoveItem,
};
use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns an inventory and writes every change through to its store.
#[derive(Debug)]
pub struct WinRecorder<S> {
    inventory: Inventory,
    store: S,
}

impl<S: InventoryStore> WinRecorder<S> {
    /// Rehydrate from whatever the store holds.
    pub fn open(id: InventoryId, store: S) -> Result<Self, StoreError> {
        let entries = store.load()?;
        debug!(entries = entries.len(), "inventory loaded");
        Ok(Self {
            inventory: Inventory::from_entries(id, entries),
            store,
        })
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Record the item of an `ItemWon` event; other reveal events are ignored.
    ///
    /// Returns whether the event changed the inventory.
    pub fn on_event(&mut self, event: &RevealEvent) -> Result<bool, RecordError> {
        let RevealEvent::ItemWon(won) = event else {
            return Ok(false);
        };
        info!(spin_id = %won.spin_id, item = %won.item.label, "recording won item");
        self.execute(InventoryCommand::RecordWin(RecordWin {
            item: won.item.clone(),
            occurred_at: won.occurred_at,
        }))?;
        Ok(true)
    }

    pub fn remove(&mut self, item_id: ItemId, at: DateTime<Utc>) -> Result<(), RecordError> {
        self.execute(InventoryCommand::RemoveItem(RemoveItem {
            item_id,
            occurred_at: at,
        }))
        .map(drop)
    }

    pub fn clear(&mut self, at: DateTime<Utc>) -> Result<(), RecordError> {
        self.execute(InventoryCommand::ClearInventory(ClearInventory { occurred_at: at }))
            .map(drop)
    }

    fn execute(&mut self, command: InventoryCommand) -> Result<Vec<InventoryEvent>, RecordError> {
        let events = self.inventory.execute(&command)?;
        if events.is_empty() {
            return Ok(events);
        }

        if events
            .iter()
            .any(|e| matches!(e, InventoryEvent::InventoryCleared(_)))
        {
            self.store.clear()?;
        } else {
            self.store.save(self.inventory.entries())?;
        }
        Ok(events)
    }
}
