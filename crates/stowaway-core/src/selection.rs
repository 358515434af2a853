use std::collections::HashSet;

use uuid::Uuid;

use crate::hierarchy::InventorySnapshot;
use crate::model::EntityKind;

/// Multi-select session over rooms, storage units, and items.
///
/// The three sets are disjoint by construction (separate `HashSet`s keyed by
/// kind), so an id selected through multiple paths is never double-counted.
/// Selection state survives failed mutations; only [`SelectionManager::exit`]
/// clears it.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    active: bool,
    rooms: HashSet<Uuid>,
    units: HashSet<Uuid>,
    items: HashSet<Uuid>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to selection mode, seeding the matching set. Triggered by a
    /// long-press on any row.
    pub fn enter(&mut self, kind: EntityKind, id: Uuid) {
        self.active = true;
        self.set_mut(kind).insert(id);
    }

    /// Add/remove an id within one kind. Selecting an item never affects the
    /// room or unit sets.
    pub fn toggle(&mut self, kind: EntityKind, id: Uuid) {
        let set = self.set_mut(kind);
        if !set.remove(&id) {
            set.insert(id);
        }
    }

    /// Context-sensitive select-all over the current snapshot.
    ///
    /// Single-active-kind heuristic: items win when any are selected (or
    /// nothing is), then rooms, then units. Only one kind is ever
    /// bulk-acted-on per operation; a mixed-kind bulk selection would need an
    /// explicit active-kind flag instead.
    pub fn select_all(&mut self, snapshot: &InventorySnapshot) {
        self.active = true;
        if !self.items.is_empty() || (self.rooms.is_empty() && self.units.is_empty()) {
            self.items.extend(snapshot.item_ids());
        } else if !self.rooms.is_empty() {
            self.rooms.extend(snapshot.room_ids());
        } else {
            self.units.extend(snapshot.unit_ids());
        }
    }

    /// Leave selection mode and clear all three sets. Idempotent.
    pub fn exit(&mut self) {
        self.active = false;
        self.rooms.clear();
        self.units.clear();
        self.items.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_selected(&self, kind: EntityKind, id: Uuid) -> bool {
        self.set(kind).contains(&id)
    }

    /// Total selected count across kinds, shown in the action bar.
    pub fn total(&self) -> usize {
        self.rooms.len() + self.units.len() + self.items.len()
    }

    /// Move/Edit bulk actions apply to items only; rooms and units get
    /// delete alone.
    pub fn can_move_or_edit(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn selected_rooms(&self) -> Vec<Uuid> {
        self.rooms.iter().copied().collect()
    }

    pub fn selected_units(&self) -> Vec<Uuid> {
        self.units.iter().copied().collect()
    }

    pub fn selected_items(&self) -> Vec<Uuid> {
        self.items.iter().copied().collect()
    }

    fn set(&self, kind: EntityKind) -> &HashSet<Uuid> {
        match kind {
            EntityKind::Room => &self.rooms,
            EntityKind::StorageUnit => &self.units,
            EntityKind::Item => &self.items,
        }
    }

    fn set_mut(&mut self, kind: EntityKind) -> &mut HashSet<Uuid> {
        match kind {
            EntityKind::Room => &mut self.rooms,
            EntityKind::StorageUnit => &mut self.units,
            EntityKind::Item => &mut self.items,
        }
    }
}
