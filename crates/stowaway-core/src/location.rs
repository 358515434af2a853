use serde::{Deserialize, Serialize};

use crate::backend::UnitWithRoom;
use crate::model::StorageUnitId;

/// Flat read view over a storage unit for move/creation pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// The storage unit's id. Moves target units, not rooms.
    pub id: StorageUnitId,
    pub name: String,
    pub room: String,
    /// Display label, `"<room> > <unit>"`.
    pub label: String,
}

impl Location {
    pub fn new(id: StorageUnitId, name: impl Into<String>, room: impl Into<String>) -> Self {
        let name = name.into();
        let room = room.into();
        let label = format!("{room} > {name}");
        Self {
            id,
            name,
            room,
            label,
        }
    }
}

/// Resolve the picker list, newest-first. A unit whose parent room was
/// deleted concurrently gets an "Unknown Room" label rather than failing.
pub fn resolve_locations(units: &[UnitWithRoom]) -> Vec<Location> {
    let mut sorted: Vec<&UnitWithRoom> = units.iter().collect();
    sorted.sort_by(|a, b| b.unit.created_at.cmp(&a.unit.created_at));
    sorted
        .into_iter()
        .map(|u| {
            let room = u.room_name.as_deref().unwrap_or("Unknown Room");
            Location::new(u.unit.id, u.unit.name.clone(), room)
        })
        .collect()
}
