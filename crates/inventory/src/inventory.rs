use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skinvault_core::{Aggregate, AggregateRoot, DomainError, InventoryId, Item, ItemId};
use skinvault_events::Event;

/// One owned item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item: Item,
    /// Snapshots written before quantities were tracked omit this field.
    #[serde(default = "first_copy")]
    pub quantity: u32,
    pub obtained_at: DateTime<Utc>,
}

fn first_copy() -> u32 {
    1
}

/// Aggregate root: Inventory.
///
/// Entries keep the order in which items were first won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    id: InventoryId,
    entries: Vec<InventoryEntry>,
    version: u64,
}

impl Inventory {
    pub fn empty(id: InventoryId) -> Self {
        Self::from_entries(id, Vec::new())
    }

    /// Rehydrate from persisted entries. Every owned item counts at least once.
    pub fn from_entries(id: InventoryId, mut entries: Vec<InventoryEntry>) -> Self {
        for entry in &mut entries {
            entry.quantity = entry.quantity.max(1);
        }
        Self {
            id,
            entries,
            version: 0,
        }
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn get(&self, item_id: ItemId) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.item.id == item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of owned copies across all entries.
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }
}

impl AggregateRoot for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordWin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWin {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearInventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearInventory {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    RecordWin(RecordWin),
    RemoveItem(RemoveItem),
    ClearInventory(ClearInventory),
}

/// Event: ItemAdded (first copy of an item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityIncremented (repeat win). `quantity` is the new total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityIncremented {
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InventoryCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCleared {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    QuantityIncremented(QuantityIncremented),
    ItemRemoved(ItemRemoved),
    InventoryCleared(InventoryCleared),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::QuantityIncremented(_) => "inventory.item.quantity_incremented",
            InventoryEvent::ItemRemoved(_) => "inventory.item.removed",
            InventoryEvent::InventoryCleared(_) => "inventory.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.occurred_at,
            InventoryEvent::QuantityIncremented(e) => e.occurred_at,
            InventoryEvent::ItemRemoved(e) => e.occurred_at,
            InventoryEvent::InventoryCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemAdded(e) => {
                self.entries.push(InventoryEntry {
                    item: e.item.clone(),
                    quantity: 1,
                    obtained_at: e.occurred_at,
                });
            }
            InventoryEvent::QuantityIncremented(e) => {
                if let Some(entry) = self.entries.iter_mut().find(|en| en.item.id == e.item_id) {
                    entry.quantity = e.quantity;
                }
            }
            InventoryEvent::ItemRemoved(e) => {
                self.entries.retain(|en| en.item.id != e.item_id);
            }
            InventoryEvent::InventoryCleared(_) => {
                self.entries.clear();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::RecordWin(cmd) => self.handle_record(cmd),
            InventoryCommand::RemoveItem(cmd) => self.handle_remove(cmd),
            InventoryCommand::ClearInventory(cmd) => Ok(self.handle_clear(cmd)),
        }
    }
}

impl Inventory {
    fn handle_record(&self, cmd: &RecordWin) -> Result<Vec<InventoryEvent>, DomainError> {
        let Some(existing) = self.get(cmd.item.id) else {
            return Ok(vec![InventoryEvent::ItemAdded(ItemAdded {
                item: cmd.item.clone(),
                occurred_at: cmd.occurred_at,
            })]);
        };

        let quantity = existing
            .quantity
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("item quantity overflow"))?;

        Ok(vec![InventoryEvent::QuantityIncremented(QuantityIncremented {
            item_id: cmd.item.id,
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.get(cmd.item_id).is_none() {
            return Err(DomainError::not_found());
        }
        Ok(vec![InventoryEvent::ItemRemoved(ItemRemoved {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearInventory) -> Vec<InventoryEvent> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![InventoryEvent::InventoryCleared(InventoryCleared {
            occurred_at: cmd.occurred_at,
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn test_inventory() -> Inventory {
        Inventory::empty(InventoryId::from_uuid(Uuid::from_u128(1)))
    }

    fn skin(n: u128, label: &str) -> Item {
        Item::new(ItemId::from_uuid(Uuid::from_u128(100 + n)), label)
    }

    fn win(item: Item) -> InventoryCommand {
        InventoryCommand::RecordWin(RecordWin {
            item,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn first_win_adds_entry() {
        let mut inventory = test_inventory();
        let events = inventory.execute(&win(skin(1, "Prime Vandal"))).unwrap();

        assert!(matches!(&events[..], [InventoryEvent::ItemAdded(_)]));
        let entry = inventory.get(skin(1, "").id).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.obtained_at, test_time());
        assert_eq!(inventory.version(), 1);
    }

    #[test]
    fn repeat_win_increments_quantity_and_keeps_first_timestamp() {
        let mut inventory = test_inventory();
        inventory.execute(&win(skin(1, "Reaver Vandal"))).unwrap();

        let later = InventoryCommand::RecordWin(RecordWin {
            item: skin(1, "Reaver Vandal"),
            occurred_at: test_time() + chrono::Duration::hours(1),
        });
        let events = inventory.execute(&later).unwrap();

        match &events[..] {
            [InventoryEvent::QuantityIncremented(e)] => assert_eq!(e.quantity, 2),
            other => panic!("unexpected events: {other:?}"),
        }
        let entry = &inventory.entries()[0];
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.obtained_at, test_time());
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn entries_keep_first_win_order() {
        let mut inventory = test_inventory();
        for (n, label) in [(3, "C"), (1, "A"), (2, "B"), (1, "A")] {
            inventory.execute(&win(skin(n, label))).unwrap();
        }
        let labels: Vec<&str> = inventory.entries().iter().map(|e| e.item.label.as_str()).collect();
        assert_eq!(labels, ["C", "A", "B"]);
        assert_eq!(inventory.total_quantity(), 4);
    }

    #[test]
    fn remove_unknown_item_is_not_found() {
        let inventory = test_inventory();
        let cmd = InventoryCommand::RemoveItem(RemoveItem {
            item_id: skin(9, "").id,
            occurred_at: test_time(),
        });
        assert_eq!(inventory.handle(&cmd).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn remove_and_clear() {
        let mut inventory = test_inventory();
        inventory.execute(&win(skin(1, "A"))).unwrap();
        inventory.execute(&win(skin(2, "B"))).unwrap();

        inventory
            .execute(&InventoryCommand::RemoveItem(RemoveItem {
                item_id: skin(1, "").id,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(inventory.len(), 1);

        let clear = InventoryCommand::ClearInventory(ClearInventory {
            occurred_at: test_time(),
        });
        assert_eq!(inventory.execute(&clear).unwrap().len(), 1);
        assert!(inventory.is_empty());
        assert!(inventory.execute(&clear).unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: total quantity equals the number of recorded wins, and there
        /// is exactly one entry per distinct item.
        #[test]
        fn quantities_count_wins(wins in prop::collection::vec(0u128..8, 0..64)) {
            let mut inventory = test_inventory();
            for n in &wins {
                inventory.execute(&win(skin(*n, "skin"))).unwrap();
            }
            let distinct: std::collections::HashSet<_> = wins.iter().collect();
            prop_assert_eq!(inventory.total_quantity(), wins.len() as u64);
            prop_assert_eq!(inventory.len(), distinct.len());
            prop_assert_eq!(inventory.version(), wins.len() as u64);
        }
    }
}
