//! Undoing an earlier edit on top of the latest revision

use crate::converter::SchemaConverter;
use crate::differ::{EntitySchemaDiffer, SchemaDiff};
use crate::error::{Result, SchemaError};
use crate::id::EntitySchemaId;
use crate::patcher::EntitySchemaPatcher;
use crate::schema::FullArraySchemaData;

/// Computes and applies undo diffs between page contents
#[derive(Debug, Clone, Copy, Default)]
pub struct UndoHandler {
    converter: SchemaConverter,
    differ: EntitySchemaDiffer,
    patcher: EntitySchemaPatcher,
}

impl UndoHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All contents must belong to the same schema; returns its ID
    pub fn validate_content_ids(&self, contents: &[&str]) -> Result<EntitySchemaId> {
        let mut expected: Option<String> = None;
        for content in contents {
            let id = self
                .converter
                .get_schema_id(content)?
                .ok_or_else(|| SchemaError::InvalidFormat("content has no id".to_string()))?;
            match &expected {
                Some(first) if *first != id => {
                    return Err(SchemaError::IdMismatch {
                        expected: first.clone(),
                        actual: id,
                    })
                }
                Some(_) => {}
                None => expected = Some(id),
            }
        }
        let id = expected.ok_or_else(|| SchemaError::InvalidInput("no contents to compare".to_string()))?;
        EntitySchemaId::new(id)
    }

    /// The diff that reverts the edit `undo_to -> undo_from`
    pub fn get_diff_from_contents(&self, undo_from: &str, undo_to: &str) -> Result<SchemaDiff> {
        self.differ.diff_contents(undo_from, undo_to)
    }

    /// Apply an undo diff to the latest content
    pub fn try_patching_undo_diff(&self, latest: &str, diff: &SchemaDiff) -> Result<FullArraySchemaData> {
        let latest = self.converter.get_full_array_schema_data(latest)?;
        self.patcher.patch_schema(&latest, diff)
    }
}
