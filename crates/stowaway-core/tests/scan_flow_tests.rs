//! End-to-end scan-review flow: detections → editable rows → saved items.

use std::sync::Arc;

use stowaway_core::{
    DeletePolicy, DetectedItem, InventoryError, MemoryBackend, MemoryObjectStore,
    MutationCoordinator, ReviewList, SCAN_IMPORT_LABEL,
};

fn coordinator(
    objects: MemoryObjectStore,
) -> (Arc<MemoryBackend>, Arc<MemoryObjectStore>, MutationCoordinator) {
    let backend = Arc::new(MemoryBackend::new());
    let objects = Arc::new(objects);
    let coordinator =
        MutationCoordinator::new(backend.clone(), objects.clone(), DeletePolicy::Strict).unwrap();
    (backend, objects, coordinator)
}

fn detected(name: &str, category: &str, quantity: u32) -> DetectedItem {
    DetectedItem {
        name: name.into(),
        category: category.into(),
        quantity,
    }
}

#[test]
fn reviewed_scan_saves_into_the_chosen_unit() {
    let (_, objects, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Bathroom", "Medicine Cabinet").unwrap();

    let list = ReviewList::from_detected(vec![
        detected("Advil", "Medicine", 1),
        detected("Band-Aids", "Medicine", 2),
    ]);
    let saved = coordinator
        .save_review(&list, Some(&[0xFF, 0xD8, 0xFF]), Some(&location))
        .unwrap();
    assert_eq!(saved, 2);
    assert_eq!(objects.object_count(), 1);

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.total_items(), 2);
    assert!(snapshot.unsorted.is_empty());
    let unit = &snapshot.rooms[0].units[0];
    for item in &unit.items {
        assert_eq!(item.storage_id, Some(location.id));
        assert_eq!(item.detected_labels, vec![SCAN_IMPORT_LABEL.to_string()]);
        assert!(item
            .image_url
            .as_deref()
            .is_some_and(|url| url.starts_with("memory://scans/")));
    }
}

#[test]
fn user_corrections_survive_to_the_saved_rows() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Office", "Desk Drawer").unwrap();

    let mut list = ReviewList::from_detected(vec![detected("pen", "General", 1)]);
    list.set_name(0, "Fountain Pen");
    list.set_category(0, "Stationery");
    list.set_quantity(0, "3");
    list.add_row();
    list.set_name(1, "Notebook");

    coordinator.save_review(&list, None, Some(&location)).unwrap();
    let snapshot = coordinator.snapshot();
    let items = &snapshot.rooms[0].units[0].items;
    assert_eq!(items.len(), 2);
    let pen = items.iter().find(|i| i.name == "Fountain Pen").unwrap();
    assert_eq!(pen.category, "Stationery");
    assert_eq!(pen.quantity, 3);
    let notebook = items.iter().find(|i| i.name == "Notebook").unwrap();
    assert_eq!(notebook.quantity, 1);
    assert!(notebook.image_url.is_none());
}

#[test]
fn save_without_a_location_is_rejected_before_any_write() {
    let (backend, objects, mut coordinator) = coordinator(MemoryObjectStore::new());
    let writes_before = backend.write_ops();

    let list = ReviewList::from_detected(vec![detected("Mug", "Kitchen", 1)]);
    let err = coordinator
        .save_review(&list, Some(&[0xFF]), None)
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));
    assert_eq!(backend.write_ops(), writes_before);
    assert_eq!(objects.object_count(), 0);
}

#[test]
fn empty_review_is_rejected() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Office", "Shelf A").unwrap();

    let mut list = ReviewList::from_detected(vec![detected("Mug", "Kitchen", 1)]);
    list.remove_row(0);
    let err = coordinator
        .save_review(&list, None, Some(&location))
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));
}

#[test]
fn upload_failure_saves_items_without_an_image() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::failing());
    let location = coordinator.create_location("Garage", "Tool Chest").unwrap();

    let list = ReviewList::from_detected(vec![detected("Hammer", "Tools", 1)]);
    let saved = coordinator
        .save_review(&list, Some(&[0xFF, 0xD8]), Some(&location))
        .unwrap();
    assert_eq!(saved, 1);

    let snapshot = coordinator.snapshot();
    let item = &snapshot.rooms[0].units[0].items[0];
    assert!(item.image_url.is_none());
    assert_eq!(item.detected_labels, vec![SCAN_IMPORT_LABEL.to_string()]);
}

#[test]
fn failed_analysis_still_yields_a_saveable_row() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Hallway", "Closet").unwrap();

    let list = ReviewList::from_analysis(Err(InventoryError::Backend("model timeout".into())));
    assert_eq!(list.len(), 1);
    coordinator.save_review(&list, None, Some(&location)).unwrap();
    let snapshot = coordinator.snapshot();
    assert_eq!(
        snapshot.rooms[0].units[0].items[0].name,
        "Error scanning item"
    );
}

#[test]
fn empty_detection_seeds_a_placeholder_that_saves_cleanly() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Attic", "Box 3").unwrap();

    let list = ReviewList::from_detected(vec![]);
    coordinator.save_review(&list, None, Some(&location)).unwrap();
    let snapshot = coordinator.snapshot();
    let item = &snapshot.rooms[0].units[0].items[0];
    assert_eq!(item.name, "Unknown Item");
    assert_eq!(item.category, "General");
    assert_eq!(item.quantity, 1);
}

#[test]
fn garbled_quantities_are_clamped_at_save() {
    let (_, _, mut coordinator) = coordinator(MemoryObjectStore::new());
    let location = coordinator.create_location("Kitchen", "Pantry").unwrap();

    let mut list = ReviewList::from_detected(vec![
        detected("Pasta", "Food", 4),
        detected("Rice", "Food", 1),
    ]);
    list.set_quantity(0, "a few");
    list.set_quantity(1, "0");
    coordinator.save_review(&list, None, Some(&location)).unwrap();

    let snapshot = coordinator.snapshot();
    for item in &snapshot.rooms[0].units[0].items {
        assert_eq!(item.quantity, 1);
    }
}
