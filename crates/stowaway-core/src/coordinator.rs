use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{InventoryBackend, ItemPatch, ObjectStore};
use crate::error::{InventoryError, Result};
use crate::hierarchy::InventorySnapshot;
use crate::location::{resolve_locations, Location};
use crate::model::{EntityKind, ItemId, NewItem, RecentItem, RoomId, SearchHit, StorageUnitId};
use crate::scan::ReviewList;

/// How container deletion treats transitively owned items.
///
/// Both policies exist in this app's history. They produce materially
/// different user-visible outcomes (blocked action vs. silent orphaning), so
/// the coordinator takes one explicitly and applies it everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Block deletion of a room/unit while it owns ≥1 item, reporting the
    /// count. The default.
    #[default]
    Strict,
    /// Reassign owned items to the unsorted set, then delete.
    Cascade,
}

/// Per-kind outcome counts for a bulk delete. Skipped means a container was
/// non-empty under the strict policy; skipping one never blocks the rest of
/// the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteReport {
    pub deleted_rooms: usize,
    pub skipped_rooms: usize,
    pub deleted_units: usize,
    pub skipped_units: usize,
    pub deleted_items: usize,
}

impl BulkDeleteReport {
    pub fn skipped(&self) -> usize {
        self.skipped_rooms + self.skipped_units
    }

    pub fn deleted(&self) -> usize {
        self.deleted_rooms + self.deleted_units + self.deleted_items
    }
}

/// Uniform partial patch for a bulk edit: any omitted field is left
/// untouched on every targeted item. A provided photo is uploaded once and
/// the same URL is applied to all targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkEditPatch {
    pub name: Option<String>,
    pub photo: Option<Vec<u8>>,
}

/// Single entry point for structural mutations.
///
/// Per mutation: Idle → Validating → {Aborted | Executing → terminal}.
/// Validation failures are raised before any network call and skip the
/// refetch; every operation that reached the backend ends by refetching the
/// full hierarchy and location list into the coordinator's snapshot. No
/// incremental or optimistic patching.
pub struct MutationCoordinator {
    backend: Arc<dyn InventoryBackend>,
    objects: Arc<dyn ObjectStore>,
    policy: DeletePolicy,
    snapshot: InventorySnapshot,
    locations: Vec<Location>,
}

impl MutationCoordinator {
    /// Build a coordinator and perform the initial fetch.
    pub fn new(
        backend: Arc<dyn InventoryBackend>,
        objects: Arc<dyn ObjectStore>,
        policy: DeletePolicy,
    ) -> Result<Self> {
        let mut coordinator = Self {
            backend,
            objects,
            policy,
            snapshot: InventorySnapshot::default(),
            locations: Vec::new(),
        };
        coordinator.refresh()?;
        Ok(coordinator)
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// The hierarchy as of the last fetch.
    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }

    /// The picker list as of the last fetch, newest-first.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Refetch the hierarchy, unsorted set, and location list.
    pub fn refresh(&mut self) -> Result<()> {
        let rooms = self.backend.fetch_hierarchy()?;
        let unsorted = self.backend.fetch_unsorted()?;
        let units = self.backend.fetch_storage_units()?;
        self.snapshot = InventorySnapshot { rooms, unsorted };
        self.locations = resolve_locations(&units);
        Ok(())
    }

    /// Rename a room or storage unit. Items are renamed via
    /// [`MutationCoordinator::bulk_edit`].
    pub fn rename(&mut self, kind: EntityKind, id: Uuid, new_name: &str) -> Result<()> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(InventoryError::Validation("name cannot be empty".into()));
        }
        tracing::debug!(%kind, %id, name, "rename");
        let result = match kind {
            EntityKind::Room => self.backend.update_room_name(id, name),
            EntityKind::StorageUnit => self.backend.update_unit_name(id, name),
            EntityKind::Item => {
                return Err(InventoryError::Validation(
                    "items are renamed via bulk edit".into(),
                ))
            }
        };
        self.finish(result)
    }

    /// Delete a room under the configured policy. Emptiness is re-validated
    /// against the backend at delete time, not selection time.
    pub fn delete_room(&mut self, id: RoomId) -> Result<()> {
        tracing::debug!(%id, policy = ?self.policy, "delete room");
        let result = self.delete_room_inner(id);
        self.finish(result)
    }

    pub fn delete_storage_unit(&mut self, id: StorageUnitId) -> Result<()> {
        tracing::debug!(%id, policy = ?self.policy, "delete storage unit");
        let result = self.delete_unit_inner(id);
        self.finish(result)
    }

    /// Move items into a destination storage unit as one set-based update.
    /// Single-item move is the one-element case.
    pub fn move_items(
        &mut self,
        item_ids: &[ItemId],
        destination: Option<StorageUnitId>,
    ) -> Result<()> {
        let ids = dedup(item_ids);
        if ids.is_empty() {
            return Err(InventoryError::Validation("no items selected".into()));
        }
        let Some(dest) = destination else {
            return Err(InventoryError::Validation(
                "no destination selected".into(),
            ));
        };
        tracing::debug!(count = ids.len(), %dest, "move items");
        let result = self
            .backend
            .update_items(&ids, &ItemPatch::move_to(Some(dest)));
        self.finish(result)
    }

    /// Delete a mixed selection. Rooms and units are checked individually
    /// (the strict policy needs a per-entity emptiness check); items go in
    /// one set operation. Non-empty containers are skipped and reported, not
    /// failed; one non-empty room must not block the rest of the batch.
    pub fn bulk_delete(
        &mut self,
        room_ids: &[RoomId],
        unit_ids: &[StorageUnitId],
        item_ids: &[ItemId],
    ) -> Result<BulkDeleteReport> {
        let room_ids = dedup(room_ids);
        let unit_ids = dedup(unit_ids);
        let item_ids = dedup(item_ids);
        if room_ids.is_empty() && unit_ids.is_empty() && item_ids.is_empty() {
            return Err(InventoryError::Validation("nothing selected".into()));
        }
        tracing::debug!(
            rooms = room_ids.len(),
            units = unit_ids.len(),
            items = item_ids.len(),
            "bulk delete"
        );
        let result = self.bulk_delete_inner(&room_ids, &unit_ids, &item_ids);
        self.finish(result)
    }

    /// Apply a uniform partial patch to a set of items. A photo, when
    /// present, is uploaded once; every targeted item gets the same URL.
    pub fn bulk_edit(&mut self, item_ids: &[ItemId], patch: BulkEditPatch) -> Result<()> {
        let ids = dedup(item_ids);
        if ids.is_empty() {
            return Err(InventoryError::Validation("no items selected".into()));
        }
        let name = patch
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        if name.is_none() && patch.photo.is_none() {
            return Err(InventoryError::Validation(
                "enter a new name or select a new photo".into(),
            ));
        }
        tracing::debug!(count = ids.len(), renaming = name.is_some(), "bulk edit");
        let result = (|| {
            let image_url = match &patch.photo {
                Some(bytes) => Some(self.upload_scan(bytes)?),
                None => None,
            };
            let row_patch = ItemPatch {
                name,
                image_url,
                storage_id: None,
            };
            self.backend.update_items(&ids, &row_patch)
        })();
        self.finish(result)
    }

    /// Paired creation: a storage unit always gets a parent room.
    pub fn create_location(&mut self, room_name: &str, unit_name: &str) -> Result<Location> {
        let room_name = room_name.trim();
        let unit_name = unit_name.trim();
        if room_name.is_empty() || unit_name.is_empty() {
            return Err(InventoryError::Validation(
                "both room and unit names are required".into(),
            ));
        }
        tracing::debug!(room_name, unit_name, "create location");
        let result = (|| {
            let room = self.backend.insert_room(room_name)?;
            let unit = self.backend.insert_storage_unit(unit_name, room.id)?;
            Ok(Location::new(unit.id, unit.name, room.name))
        })();
        self.finish(result)
    }

    /// Insert items (manual add or scan save). Quantities below 1 are
    /// clamped to 1.
    pub fn add_items(&mut self, records: Vec<NewItem>) -> Result<usize> {
        if records.is_empty() {
            return Err(InventoryError::Validation("no items to save".into()));
        }
        let records: Vec<NewItem> = records
            .into_iter()
            .map(|mut r| {
                r.quantity = r.quantity.max(1);
                r
            })
            .collect();
        tracing::debug!(count = records.len(), "add items");
        let result = self.backend.insert_items(&records).map(|saved| saved.len());
        self.finish(result)
    }

    /// Save a reviewed scan: upload the photo once, insert every row with
    /// the chosen destination. An upload failure is tolerated: items are
    /// saved without an image rather than losing the scan.
    pub fn save_review(
        &mut self,
        review: &ReviewList,
        photo_jpeg: Option<&[u8]>,
        destination: Option<&Location>,
    ) -> Result<usize> {
        if review.is_empty() {
            return Err(InventoryError::Validation("nothing to save".into()));
        }
        let Some(location) = destination else {
            return Err(InventoryError::Validation("no location selected".into()));
        };
        let image_url = photo_jpeg.and_then(|bytes| match self.upload_scan(bytes) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(%err, "scan photo upload failed, saving items without image");
                None
            }
        });
        self.add_items(review.to_new_items(image_url, location.id))
    }

    /// Exact total item count (head-only on the backend).
    pub fn total_items(&self) -> Result<usize> {
        self.backend.count_all_items()
    }

    /// Newest items with room names for the dashboard.
    pub fn recent_items(&self, limit: usize) -> Result<Vec<RecentItem>> {
        self.backend.recent_items(limit)
    }

    /// Server-side name search, capped at `limit` hits. A blank query is an
    /// empty result list, not a request.
    pub fn search_items(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.backend.search_items(query, limit)
    }

    fn delete_room_inner(&self, id: RoomId) -> Result<()> {
        match self.policy {
            DeletePolicy::Strict => {
                let item_count = self.backend.count_items_in_room(id)?;
                if item_count > 0 {
                    return Err(InventoryError::Conflict {
                        kind: EntityKind::Room,
                        id,
                        item_count,
                    });
                }
            }
            DeletePolicy::Cascade => {
                let ids = self.backend.item_ids_in_room(id)?;
                if !ids.is_empty() {
                    self.backend.update_items(&ids, &ItemPatch::move_to(None))?;
                }
            }
        }
        self.backend.delete_room(id)
    }

    fn delete_unit_inner(&self, id: StorageUnitId) -> Result<()> {
        match self.policy {
            DeletePolicy::Strict => {
                let item_count = self.backend.count_items_in_unit(id)?;
                if item_count > 0 {
                    return Err(InventoryError::Conflict {
                        kind: EntityKind::StorageUnit,
                        id,
                        item_count,
                    });
                }
            }
            DeletePolicy::Cascade => {
                let ids = self.backend.item_ids_in_unit(id)?;
                if !ids.is_empty() {
                    self.backend.update_items(&ids, &ItemPatch::move_to(None))?;
                }
            }
        }
        self.backend.delete_storage_unit(id)
    }

    fn bulk_delete_inner(
        &self,
        room_ids: &[RoomId],
        unit_ids: &[StorageUnitId],
        item_ids: &[ItemId],
    ) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();

        for &id in room_ids {
            match self.delete_room_inner(id) {
                Ok(()) => report.deleted_rooms += 1,
                Err(InventoryError::Conflict { item_count, .. }) => {
                    tracing::warn!(%id, item_count, "skipping non-empty room");
                    report.skipped_rooms += 1;
                }
                Err(err) => return Err(err),
            }
        }

        for &id in unit_ids {
            match self.delete_unit_inner(id) {
                Ok(()) => report.deleted_units += 1,
                Err(InventoryError::Conflict { item_count, .. }) => {
                    tracing::warn!(%id, item_count, "skipping non-empty storage unit");
                    report.skipped_units += 1;
                }
                Err(err) => return Err(err),
            }
        }

        if !item_ids.is_empty() {
            self.backend.delete_items(item_ids)?;
            report.deleted_items = item_ids.len();
        }

        Ok(report)
    }

    fn upload_scan(&self, bytes: &[u8]) -> Result<String> {
        let path = format!("scans/{}.jpg", Utc::now().timestamp_millis());
        self.objects.upload(&path, bytes, "image/jpeg", false)
    }

    /// Every operation that reached the backend ends here: refetch, then
    /// hand the result back. A refetch failure after a successful mutation
    /// surfaces; after a failed one, the original error wins.
    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.refresh()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(refresh_err) = self.refresh() {
                    tracing::warn!(%refresh_err, "refetch after failed mutation also failed");
                }
                Err(err)
            }
        }
    }
}

/// Set-based de-duplication preserving first-seen order.
fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn report_totals() {
        let report = BulkDeleteReport {
            deleted_rooms: 1,
            skipped_rooms: 2,
            deleted_units: 3,
            skipped_units: 0,
            deleted_items: 4,
        };
        assert_eq!(report.deleted(), 8);
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn delete_policy_default_is_strict() {
        assert_eq!(DeletePolicy::default(), DeletePolicy::Strict);
    }
}
