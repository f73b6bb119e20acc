//! Change records for propagating schema edits to client wikis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::differ::{EntitySchemaDiffer, OperationsMap, SchemaDiff};
use crate::error::{Result, SchemaError};
use crate::id::ENTITY_TYPE;
use crate::store::{Revision, RevisionId};

/// Change type of an edited schema
pub const UPDATE_CHANGE_TYPE: &str = "wikibase-entityschema~update";

/// Which aspects of an entity an edit touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDiffChangedAspects {
    pub label_changes: Vec<String>,
    pub description_changes: Vec<String>,
    pub statement_changes: Vec<String>,
    pub site_link_changes: serde_json::Map<String, Value>,
    /// Aliases or schema text changed
    pub other_changes: bool,
}

impl EntityDiffChangedAspects {
    pub fn from_diff(diff: &SchemaDiff) -> Self {
        Self {
            label_changes: diff.labels.keys().cloned().collect(),
            description_changes: diff.descriptions.keys().cloned().collect(),
            statement_changes: Vec::new(),
            site_link_changes: serde_json::Map::new(),
            other_changes: !diff.aliases.is_empty() || diff.schema_text.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetadata {
    pub page_id: String,
    pub parent_id: Option<RevisionId>,
    pub comment: Option<String>,
    pub rev_id: RevisionId,
    pub user_text: String,
}

/// A change row describing one saved edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChange {
    /// `<schema id>-<revision id>`
    pub id: String,
    #[serde(rename = "type")]
    pub change_type: String,
    pub object_id: String,
    pub revision_id: RevisionId,
    pub time: DateTime<Utc>,
    pub metadata: ChangeMetadata,
    pub compact_diff: EntityDiffChangedAspects,
    pub operations: OperationsMap,
}

impl EntityChange {
    pub fn entity_type(&self) -> &'static str {
        ENTITY_TYPE
    }
}

/// Builds [`EntityChange`]s from pairs of revisions
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySchemaEntityChangeFactory {
    differ: EntitySchemaDiffer,
}

impl EntitySchemaEntityChangeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_for_entity_schema_modified(&self, new_rev: &Revision, old_rev: &Revision) -> Result<EntityChange> {
        if new_rev.page != old_rev.page {
            return Err(SchemaError::IdMismatch {
                expected: old_rev.page.to_string(),
                actual: new_rev.page.to_string(),
            });
        }

        let diff = self.differ.diff_contents(&old_rev.content, &new_rev.content)?;
        let mut operations = diff.operations();
        // consumers read the singular keys
        for (plural, singular) in [("labels", "label"), ("descriptions", "description")] {
            if let Some(ops) = operations.get(plural).cloned() {
                operations.insert(singular.to_string(), ops);
            }
        }

        let page = new_rev.page.to_string();
        tracing::debug!(%page, revision = new_rev.id, operations = diff.len(), "built entity change");

        Ok(EntityChange {
            id: format!("{}-{}", page, new_rev.id),
            change_type: UPDATE_CHANGE_TYPE.to_string(),
            object_id: page.clone(),
            revision_id: new_rev.id,
            time: new_rev.timestamp,
            metadata: ChangeMetadata {
                page_id: page,
                parent_id: new_rev.parent_id,
                comment: (!new_rev.summary.is_empty()).then(|| new_rev.summary.clone()),
                rev_id: new_rev.id,
                user_text: new_rev.author.clone().unwrap_or_default(),
            },
            compact_diff: EntityDiffChangedAspects::from_diff(&diff),
            operations,
        })
    }
}
