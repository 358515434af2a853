use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hierarchy::RoomNode;
use crate::model::{
    DetectedItem, Item, ItemId, NewItem, RecentItem, Room, RoomId, SearchHit, StorageUnit,
    StorageUnitId,
};

/// Partial update applied to one or more items.
///
/// `None` fields are left untouched on every targeted row. `storage_id` is
/// doubly optional: `Some(None)` moves items to the unsorted set,
/// `Some(Some(id))` moves them into a storage unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub storage_id: Option<Option<StorageUnitId>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image_url.is_none() && self.storage_id.is_none()
    }

    /// Patch that reassigns items to a destination unit (or unsorted).
    pub fn move_to(destination: Option<StorageUnitId>) -> Self {
        Self {
            storage_id: Some(destination),
            ..Self::default()
        }
    }
}

/// A storage unit joined with its parent room's name, as returned by the
/// location query. `room_name` is `None` when the parent room was deleted
/// concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitWithRoom {
    pub unit: StorageUnit,
    pub room_name: Option<String>,
}

/// The trait all inventory storage backends implement.
///
/// Row mutation primitives mirror what the hosted service offers: update and
/// delete take id sets (`in` semantics; a single id is the one-element
/// case), inserts return the stored representation, and counts are exact and
/// head-only so callers can check emptiness cheaply.
pub trait InventoryBackend: Send + Sync {
    /// Fetch the full hierarchy: rooms with nested units with nested items.
    fn fetch_hierarchy(&self) -> Result<Vec<RoomNode>>;

    /// Fetch items with no assigned storage unit (`storage_id is null`).
    fn fetch_unsorted(&self) -> Result<Vec<Item>>;

    /// Fetch all storage units joined with their room names, newest-first.
    fn fetch_storage_units(&self) -> Result<Vec<UnitWithRoom>>;

    fn insert_room(&self, name: &str) -> Result<Room>;
    fn insert_storage_unit(&self, name: &str, room_id: RoomId) -> Result<StorageUnit>;
    fn insert_items(&self, items: &[NewItem]) -> Result<Vec<Item>>;

    fn update_room_name(&self, id: RoomId, name: &str) -> Result<()>;
    fn update_unit_name(&self, id: StorageUnitId, name: &str) -> Result<()>;
    /// Apply one patch uniformly to an id set.
    fn update_items(&self, ids: &[ItemId], patch: &ItemPatch) -> Result<()>;

    /// Delete a room. Its (empty) storage units go with it; the caller is
    /// responsible for item safety per its delete policy.
    fn delete_room(&self, id: RoomId) -> Result<()>;
    fn delete_storage_unit(&self, id: StorageUnitId) -> Result<()>;
    fn delete_items(&self, ids: &[ItemId]) -> Result<()>;

    /// Exact count of items transitively owned by a room.
    fn count_items_in_room(&self, id: RoomId) -> Result<usize>;
    /// Exact count of items directly in a storage unit.
    fn count_items_in_unit(&self, id: StorageUnitId) -> Result<usize>;
    /// Exact count of all items.
    fn count_all_items(&self) -> Result<usize>;

    /// Ids of items transitively owned by a room (for cascade reassignment).
    fn item_ids_in_room(&self, id: RoomId) -> Result<Vec<ItemId>>;
    fn item_ids_in_unit(&self, id: StorageUnitId) -> Result<Vec<ItemId>>;

    /// Newest items with resolved room names, for the dashboard.
    fn recent_items(&self, limit: usize) -> Result<Vec<RecentItem>>;

    /// Case-insensitive substring search on item names, server-side, capped
    /// at `limit` hits with resolved location names.
    fn search_items(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Object storage collaborator: upload a blob, get back a public URL.
pub trait ObjectStore: Send + Sync {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<String>;
}

/// Vision inference collaborator: identify items in a photo.
///
/// Implementations must be defensive about model output (see
/// `stowaway-vision`); an empty vec means "no usable detections" and callers
/// fall back to a single placeholder row.
pub trait VisionAnalyzer: Send + Sync {
    fn analyze(&self, image_jpeg: &[u8]) -> Result<Vec<DetectedItem>>;
}
