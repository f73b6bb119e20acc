//! Error types for EntitySchema documents

use thiserror::Error;

/// Result type for EntitySchema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// EntitySchema errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid EntitySchema ID {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Unreadable schema data: {0}")]
    UnreadableSchemaData(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("EntitySchema not found: {0}")]
    NotFound(String),

    #[error("EntitySchema already exists: {0}")]
    AlreadyExists(String),

    #[error("Edit conflict on {id}: base revision {base} is not the latest revision {latest}")]
    EditConflict { id: String, base: u64, latest: u64 },

    #[error("Patch conflict in {field} for {language:?}")]
    PatchConflict {
        field: &'static str,
        language: Option<String>,
    },

    #[error("EntitySchema IDs do not match: {expected} vs {actual}")]
    IdMismatch { expected: String, actual: String },

    #[error("Wrong data value: {0}")]
    WrongDataValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Whether this error was caused by a concurrent edit
    pub fn is_conflict(&self) -> bool {
        matches!(self, SchemaError::EditConflict { .. } | SchemaError::PatchConflict { .. })
    }
}
