// Error taxonomy for the asset tracker core
//
// Validation  -> a record or draft breaks an invariant (rejected before mutation)
// NotFound    -> update/remove target is no longer in the catalog (expected race)
// Persistence -> load/save failed (logged, never rolls back the in-memory state)

use crate::entities::AssetId;
use std::fmt;

// ============================================================================
// VALIDATION
// ============================================================================

/// One violated invariant on a record or draft field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Joins a list of validation errors for display in `#[error]` strings
pub(crate) fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid asset record: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("asset {0} is not in the catalog")]
    NotFound(AssetId),
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("corrupt asset store: {0}")]
    Corrupt(String),
}

// ============================================================================
// EDIT SESSION
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no edit session is open")]
    NotOpen,

    #[error("cannot {action} while session is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("draft cannot be committed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),
}

// ============================================================================
// TRACKER (UI boundary)
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_joined() {
        let err = CatalogError::Validation(vec![
            ValidationError::new("name", "must not be blank"),
            ValidationError::new("type", "must be selected"),
        ]);

        assert_eq!(
            err.to_string(),
            "invalid asset record: name: must not be blank; type: must be selected"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = SessionError::InvalidTransition {
            from: "Creating",
            action: "enter edit mode",
        };
        assert_eq!(err.to_string(), "cannot enter edit mode while session is Creating");
    }
}
