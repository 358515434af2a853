use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemId, Room, RoomId, StorageUnit, StorageUnitId};

/// A storage unit with its directly owned items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitNode {
    pub unit: StorageUnit,
    pub items: Vec<Item>,
}

/// A room with its nested storage units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomNode {
    pub room: Room,
    pub units: Vec<UnitNode>,
}

impl RoomNode {
    /// Count of items transitively owned by this room.
    pub fn item_count(&self) -> usize {
        self.units.iter().map(|u| u.items.len()).sum()
    }
}

/// The full inventory as last fetched: the room tree plus the unsorted set.
///
/// Unsorted items live only here; an item with `storage_id == None` never
/// appears inside the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub rooms: Vec<RoomNode>,
    pub unsorted: Vec<Item>,
}

impl InventorySnapshot {
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|r| r.room.id).collect()
    }

    pub fn unit_ids(&self) -> Vec<StorageUnitId> {
        self.rooms
            .iter()
            .flat_map(|r| r.units.iter().map(|u| u.unit.id))
            .collect()
    }

    /// All item ids, sorted and unsorted alike.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.tree_items()
            .map(|i| i.id)
            .chain(self.unsorted.iter().map(|i| i.id))
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.rooms.iter().map(|r| r.item_count()).sum::<usize>() + self.unsorted.len()
    }

    /// Whether an item appears anywhere in the room tree (not the unsorted set).
    pub fn tree_contains_item(&self, id: ItemId) -> bool {
        self.tree_items().any(|i| i.id == id)
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.tree_items()
            .chain(self.unsorted.iter())
            .find(|i| i.id == id)
    }

    fn tree_items(&self) -> impl Iterator<Item = &Item> {
        self.rooms
            .iter()
            .flat_map(|r| r.units.iter())
            .flat_map(|u| u.items.iter())
    }
}
