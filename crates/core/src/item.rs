//! Catalog item shared by the reel and the inventory.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::ItemId;

/// A record with a stable identifier and a display label.
///
/// Items are never mutated and are compared **only by identifier**: two records
/// fetched at different times with different labels are the same item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub label: String,
}

impl Item {
    pub fn new(id: ItemId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl core::hash::Hash for Item {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn equality_ignores_label() {
        let id = ItemId::from_uuid(Uuid::from_u128(7));
        let a = Item::new(id, "Prime Vandal");
        let b = Item::new(id, "Prime Vandal (renamed)");
        assert_eq!(a, b);

        let c = Item::new(ItemId::from_uuid(Uuid::from_u128(8)), "Prime Vandal");
        assert_ne!(a, c);
    }
}
