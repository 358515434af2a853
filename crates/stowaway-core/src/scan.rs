use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DetectedItem, NewItem, StorageUnitId};

/// Label attached to every item saved through the scan flow.
pub const SCAN_IMPORT_LABEL: &str = "ai-import";

/// One editable row in the scan review list. Quantity stays a string while
/// the user edits; it is parsed leniently at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub name: String,
    pub category: String,
    pub quantity: String,
}

impl ReviewRow {
    fn blank() -> Self {
        Self {
            name: String::new(),
            category: "General".into(),
            quantity: "1".into(),
        }
    }
}

/// The in-memory review list between vision analysis and save.
///
/// Seeded from the model's guesses; the user can correct, remove, and add
/// rows before committing the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewList {
    rows: Vec<ReviewRow>,
}

impl ReviewList {
    /// Seed from detections. An empty result seeds a single "Unknown Item"
    /// placeholder so the user always has something to correct.
    pub fn from_detected(detected: Vec<DetectedItem>) -> Self {
        if detected.is_empty() {
            return Self {
                rows: vec![ReviewRow {
                    name: "Unknown Item".into(),
                    category: "General".into(),
                    quantity: "1".into(),
                }],
            };
        }
        Self {
            rows: detected
                .into_iter()
                .map(|d| ReviewRow {
                    name: d.name,
                    category: d.category,
                    quantity: d.quantity.max(1).to_string(),
                })
                .collect(),
        }
    }

    /// Seed from an analysis outcome. A failed analysis still produces an
    /// editable row; the scan is never lost to a model error.
    pub fn from_analysis(result: Result<Vec<DetectedItem>>) -> Self {
        match result {
            Ok(detected) => Self::from_detected(detected),
            Err(_) => Self {
                rows: vec![ReviewRow {
                    name: "Error scanning item".into(),
                    category: "General".into(),
                    quantity: "1".into(),
                }],
            },
        }
    }

    /// Append a blank manual row.
    pub fn add_row(&mut self) {
        self.rows.push(ReviewRow::blank());
    }

    /// Remove a row; out-of-range indices are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn set_name(&mut self, index: usize, value: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.name = value.to_string();
        }
    }

    pub fn set_category(&mut self, index: usize, value: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.category = value.to_string();
        }
    }

    pub fn set_quantity(&mut self, index: usize, value: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.quantity = value.to_string();
        }
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turn the rows into insert payloads for one destination. Every row
    /// gets the same (optional) image URL; the batch shares one photo.
    pub fn to_new_items(
        &self,
        image_url: Option<String>,
        storage_id: StorageUnitId,
    ) -> Vec<NewItem> {
        self.rows
            .iter()
            .map(|row| NewItem {
                name: row.name.clone(),
                quantity: parse_quantity(&row.quantity),
                category: row.category.clone(),
                image_url: image_url.clone(),
                storage_id: Some(storage_id),
                detected_labels: vec![SCAN_IMPORT_LABEL.into()],
            })
            .collect()
    }
}

/// Lenient quantity parse: anything unparsable or below 1 becomes 1.
fn parse_quantity(raw: &str) -> u32 {
    raw.trim().parse::<u32>().ok().filter(|q| *q >= 1).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InventoryError;
    use rstest::rstest;
    use uuid::Uuid;

    fn detected(name: &str, quantity: u32) -> DetectedItem {
        DetectedItem {
            name: name.into(),
            category: "General".into(),
            quantity,
        }
    }

    #[test]
    fn empty_detection_seeds_unknown_item() {
        let list = ReviewList::from_detected(vec![]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].name, "Unknown Item");
        assert_eq!(list.rows()[0].category, "General");
        assert_eq!(list.rows()[0].quantity, "1");
    }

    #[test]
    fn failed_analysis_seeds_error_row() {
        let list = ReviewList::from_analysis(Err(InventoryError::Backend("boom".into())));
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].name, "Error scanning item");
    }

    #[test]
    fn row_editing() {
        let mut list = ReviewList::from_detected(vec![detected("Advil", 1), detected("Mug", 2)]);
        list.set_name(0, "Advil Liqui-Gels");
        list.set_quantity(1, "3");
        list.add_row();
        assert_eq!(list.len(), 3);
        assert_eq!(list.rows()[0].name, "Advil Liqui-Gels");
        assert_eq!(list.rows()[1].quantity, "3");
        assert_eq!(list.rows()[2].category, "General");

        list.remove_row(0);
        assert_eq!(list.len(), 2);
        assert_eq!(list.rows()[0].name, "Mug");

        // Out-of-range edits are ignored.
        list.remove_row(99);
        list.set_name(99, "nope");
        assert_eq!(list.len(), 2);
    }

    #[rstest]
    #[case("4", 4)]
    #[case(" 2 ", 2)]
    #[case("0", 1)]
    #[case("-3", 1)]
    #[case("abc", 1)]
    #[case("", 1)]
    fn quantity_parse_is_lenient(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(parse_quantity(raw), expected);
    }

    #[test]
    fn to_new_items_shares_photo_and_destination() {
        let list = ReviewList::from_detected(vec![detected("Mouse", 1), detected("Plant", 1)]);
        let dest = Uuid::new_v4();
        let records = list.to_new_items(Some("https://cdn/scans/1.jpg".into()), dest);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.storage_id, Some(dest));
            assert_eq!(record.image_url.as_deref(), Some("https://cdn/scans/1.jpg"));
            assert_eq!(record.detected_labels, vec![SCAN_IMPORT_LABEL.to_string()]);
        }
    }
}
