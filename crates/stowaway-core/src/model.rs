use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Room identifier (UUID v4).
pub type RoomId = Uuid;

/// Storage unit identifier (UUID v4).
pub type StorageUnitId = Uuid;

/// Item identifier (UUID v4).
pub type ItemId = Uuid;

/// The three entity kinds a user can select and bulk-act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Room,
    StorageUnit,
    Item,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Room => write!(f, "room"),
            EntityKind::StorageUnit => write!(f, "storage unit"),
            EntityKind::Item => write!(f, "item"),
        }
    }
}

/// Top-level physical location grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A container within a room (shelf, box, cabinet) that directly holds items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageUnit {
    pub id: StorageUnitId,
    pub name: String,
    pub room_id: RoomId,
    pub created_at: DateTime<Utc>,
}

/// A tracked item. `storage_id == None` means "unsorted", a first-class
/// state rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub image_url: Option<String>,
    pub storage_id: Option<StorageUnitId>,
    pub detected_labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new item. Ids and timestamps are assigned by the
/// backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub image_url: Option<String>,
    pub storage_id: Option<StorageUnitId>,
    pub detected_labels: Vec<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(1),
            category: category.into(),
            image_url: None,
            storage_id: None,
            detected_labels: Vec::new(),
        }
    }
}

/// One guess from the vision model: what it saw, roughly categorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
}

/// A name-search result: the matching item's display fields plus its
/// resolved location names. Unsorted items match with both names `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub image_url: Option<String>,
    pub unit_name: Option<String>,
    pub room_name: Option<String>,
}

/// A recently added item with its resolved room name, for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentItem {
    pub name: String,
    pub room_name: Option<String>,
}
