//! In-memory backend and object store, for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::backend::{InventoryBackend, ItemPatch, ObjectStore, UnitWithRoom};
use crate::error::{InventoryError, Result};
use crate::hierarchy::{RoomNode, UnitNode};
use crate::model::{
    Item, ItemId, NewItem, RecentItem, Room, RoomId, SearchHit, StorageUnit, StorageUnitId,
};

#[derive(Default)]
struct State {
    rooms: Vec<Room>,
    units: Vec<StorageUnit>,
    items: Vec<Item>,
}

/// In-memory [`InventoryBackend`]. Tracks the number of write operations so
/// tests can assert that validation failures never reach the backend.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls (inserts, updates, deletes) seen so far.
    pub fn write_ops(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn unit_ids_of_room(state: &State, room_id: RoomId) -> Vec<StorageUnitId> {
        state
            .units
            .iter()
            .filter(|u| u.room_id == room_id)
            .map(|u| u.id)
            .collect()
    }
}

impl InventoryBackend for MemoryBackend {
    fn fetch_hierarchy(&self) -> Result<Vec<RoomNode>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rooms
            .iter()
            .map(|room| RoomNode {
                room: room.clone(),
                units: state
                    .units
                    .iter()
                    .filter(|u| u.room_id == room.id)
                    .map(|unit| UnitNode {
                        unit: unit.clone(),
                        items: state
                            .items
                            .iter()
                            .filter(|i| i.storage_id == Some(unit.id))
                            .cloned()
                            .collect(),
                    })
                    .collect(),
            })
            .collect())
    }

    fn fetch_unsorted(&self) -> Result<Vec<Item>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| i.storage_id.is_none())
            .cloned()
            .collect())
    }

    fn fetch_storage_units(&self) -> Result<Vec<UnitWithRoom>> {
        let state = self.state.lock().unwrap();
        let mut units: Vec<UnitWithRoom> = state
            .units
            .iter()
            .map(|unit| UnitWithRoom {
                unit: unit.clone(),
                room_name: state
                    .rooms
                    .iter()
                    .find(|r| r.id == unit.room_id)
                    .map(|r| r.name.clone()),
            })
            .collect();
        units.sort_by(|a, b| b.unit.created_at.cmp(&a.unit.created_at));
        Ok(units)
    }

    fn insert_room(&self, name: &str) -> Result<Room> {
        self.record_write();
        let room = Room {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().rooms.push(room.clone());
        Ok(room)
    }

    fn insert_storage_unit(&self, name: &str, room_id: RoomId) -> Result<StorageUnit> {
        self.record_write();
        let unit = StorageUnit {
            id: Uuid::new_v4(),
            name: name.to_string(),
            room_id,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().units.push(unit.clone());
        Ok(unit)
    }

    fn insert_items(&self, items: &[NewItem]) -> Result<Vec<Item>> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        let stored: Vec<Item> = items
            .iter()
            .map(|n| Item {
                id: Uuid::new_v4(),
                name: n.name.clone(),
                quantity: n.quantity,
                category: n.category.clone(),
                image_url: n.image_url.clone(),
                storage_id: n.storage_id,
                detected_labels: n.detected_labels.clone(),
                created_at: Utc::now(),
            })
            .collect();
        state.items.extend(stored.clone());
        Ok(stored)
    }

    fn update_room_name(&self, id: RoomId, name: &str) -> Result<()> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        match state.rooms.iter_mut().find(|r| r.id == id) {
            Some(room) => {
                room.name = name.to_string();
                Ok(())
            }
            None => Err(InventoryError::Backend(format!("room not found: {id}"))),
        }
    }

    fn update_unit_name(&self, id: StorageUnitId, name: &str) -> Result<()> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        match state.units.iter_mut().find(|u| u.id == id) {
            Some(unit) => {
                unit.name = name.to_string();
                Ok(())
            }
            None => Err(InventoryError::Backend(format!(
                "storage unit not found: {id}"
            ))),
        }
    }

    fn update_items(&self, ids: &[ItemId], patch: &ItemPatch) -> Result<()> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        for item in state.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            if let Some(name) = &patch.name {
                item.name = name.clone();
            }
            if let Some(url) = &patch.image_url {
                item.image_url = Some(url.clone());
            }
            if let Some(storage) = patch.storage_id {
                item.storage_id = storage;
            }
        }
        Ok(())
    }

    fn delete_room(&self, id: RoomId) -> Result<()> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        state.units.retain(|u| u.room_id != id);
        state.rooms.retain(|r| r.id != id);
        Ok(())
    }

    fn delete_storage_unit(&self, id: StorageUnitId) -> Result<()> {
        self.record_write();
        self.state.lock().unwrap().units.retain(|u| u.id != id);
        Ok(())
    }

    fn delete_items(&self, ids: &[ItemId]) -> Result<()> {
        self.record_write();
        self.state
            .lock()
            .unwrap()
            .items
            .retain(|i| !ids.contains(&i.id));
        Ok(())
    }

    fn count_items_in_room(&self, id: RoomId) -> Result<usize> {
        let state = self.state.lock().unwrap();
        let units = Self::unit_ids_of_room(&state, id);
        Ok(state
            .items
            .iter()
            .filter(|i| i.storage_id.map(|s| units.contains(&s)).unwrap_or(false))
            .count())
    }

    fn count_items_in_unit(&self, id: StorageUnitId) -> Result<usize> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| i.storage_id == Some(id))
            .count())
    }

    fn count_all_items(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().items.len())
    }

    fn item_ids_in_room(&self, id: RoomId) -> Result<Vec<ItemId>> {
        let state = self.state.lock().unwrap();
        let units = Self::unit_ids_of_room(&state, id);
        Ok(state
            .items
            .iter()
            .filter(|i| i.storage_id.map(|s| units.contains(&s)).unwrap_or(false))
            .map(|i| i.id)
            .collect())
    }

    fn item_ids_in_unit(&self, id: StorageUnitId) -> Result<Vec<ItemId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| i.storage_id == Some(id))
            .map(|i| i.id)
            .collect())
    }

    fn recent_items(&self, limit: usize) -> Result<Vec<RecentItem>> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<&Item> = state.items.iter().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items
            .into_iter()
            .take(limit)
            .map(|item| RecentItem {
                name: item.name.clone(),
                room_name: item
                    .storage_id
                    .and_then(|sid| state.units.iter().find(|u| u.id == sid))
                    .and_then(|unit| state.rooms.iter().find(|r| r.id == unit.room_id))
                    .map(|room| room.name.clone()),
            })
            .collect())
    }

    fn search_items(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let needle = query.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|item| {
                let unit = item
                    .storage_id
                    .and_then(|sid| state.units.iter().find(|u| u.id == sid));
                SearchHit {
                    id: item.id,
                    name: item.name.clone(),
                    quantity: item.quantity,
                    category: item.category.clone(),
                    image_url: item.image_url.clone(),
                    unit_name: unit.map(|u| u.name.clone()),
                    room_name: unit
                        .and_then(|u| state.rooms.iter().find(|r| r.id == u.room_id))
                        .map(|r| r.name.clone()),
                }
            })
            .collect())
    }
}

/// In-memory [`ObjectStore`] returning `memory://` URLs. Can be constructed
/// failing to exercise upload-failure tolerance.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every upload fails with a backend error.
    pub fn failing() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_uploads: true,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
        upsert: bool,
    ) -> Result<String> {
        if self.fail_uploads {
            return Err(InventoryError::Backend("upload failed".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        if !upsert && objects.contains_key(path) {
            return Err(InventoryError::Backend(format!(
                "object already exists: {path}"
            )));
        }
        objects.insert(path.to_string(), bytes.to_vec());
        Ok(format!("memory://{path}"))
    }
}
