use uuid::Uuid;

use crate::model::EntityKind;

/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors from inventory operations.
///
/// Validation errors are raised before any network call; conflicts abort a
/// single entity's deletion; backend errors are surfaced verbatim and never
/// retried automatically. None of these touch selection state, so a user can
/// retry a failed mutation with the same selection.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot delete {kind} {id}: it still contains {item_count} item(s)")]
    Conflict {
        kind: EntityKind,
        id: Uuid,
        item_count: usize,
    },

    #[error("Backend error: {0}")]
    Backend(String),
}

impl InventoryError {
    /// Blocking item count for a strict-delete conflict, if that is what
    /// this error is.
    pub fn conflict_count(&self) -> Option<usize> {
        match self {
            InventoryError::Conflict { item_count, .. } => Some(*item_count),
            _ => None,
        }
    }
}
