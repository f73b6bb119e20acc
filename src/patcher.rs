//! Applying a [`SchemaDiff`] to schema data
//!
//! An operation applies when the current value is what the diff expects as
//! the old value, or when the current value already equals the target. Any
//! other state is a conflict.

use std::collections::BTreeMap;

use crate::differ::{DiffOp, SchemaDiff, SCHEMA_TEXT};
use crate::error::{Result, SchemaError};
use crate::format::{ALIASES, DESCRIPTIONS, LABELS};
use crate::schema::FullArraySchemaData;

#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySchemaPatcher;

impl EntitySchemaPatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn patch_schema(&self, base: &FullArraySchemaData, diff: &SchemaDiff) -> Result<FullArraySchemaData> {
        let mut patched = base.clone();
        patch_map(&mut patched.labels, &diff.labels, LABELS)?;
        patch_map(&mut patched.descriptions, &diff.descriptions, DESCRIPTIONS)?;
        patch_map(&mut patched.aliases, &diff.aliases, ALIASES)?;

        if let Some(op) = &diff.schema_text {
            let current = (!patched.schema_text.is_empty()).then(|| patched.schema_text.clone());
            let target = apply_op(current.as_ref(), op).ok_or(SchemaError::PatchConflict {
                field: SCHEMA_TEXT,
                language: None,
            })?;
            patched.schema_text = target.unwrap_or_default();
        }

        Ok(patched)
    }
}

/// The value after applying `op` to `current`, or `None` on conflict.
/// `Some(None)` means the slot ends up absent.
fn apply_op<T: Clone + PartialEq>(current: Option<&T>, op: &DiffOp<T>) -> Option<Option<T>> {
    let target = op.new_value();
    if current == target || current == op.old_value() {
        Some(target.cloned())
    } else {
        None
    }
}

fn patch_map<T: Clone + PartialEq>(
    map: &mut BTreeMap<String, T>,
    ops: &BTreeMap<String, DiffOp<T>>,
    field: &'static str,
) -> Result<()> {
    for (language, op) in ops {
        let target = apply_op(map.get(language), op).ok_or_else(|| SchemaError::PatchConflict {
            field,
            language: Some(language.clone()),
        })?;
        match target {
            Some(value) => map.insert(language.clone(), value),
            None => map.remove(language),
        };
    }
    Ok(())
}
