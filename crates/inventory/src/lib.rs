//! Inventory of won items (event-sourced).
//!
//! The reel never reads this back: it only emits `ItemWon`, which
//! [`WinRecorder`] turns into commands against the [`Inventory`] aggregate and
//! hands the result to an [`InventoryStore`].

pub mod inventory;
pub mod recorder;
pub mod snapshot;
pub mod store;

pub use inventory::{
    ClearInventory, Inventory, InventoryCleared, InventoryCommand, InventoryEntry, InventoryEvent,
    ItemAdded, ItemRemoved, QuantityIncremented, RecordWin, RemoveItem,
};
pub use recorder::{RecordError, WinRecorder};
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError};
