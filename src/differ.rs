//! Structured diffs between two revisions of a schema
//!
//! Labels, descriptions and aliases are diffed per language; the schema text
//! is a single slot. An undefined term and an empty schema text both count as
//! "absent", so setting one is an add and clearing one is a remove.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use similar::TextDiff;

use crate::converter::SchemaConverter;
use crate::error::Result;
use crate::format::{ALIASES, DESCRIPTIONS, LABELS};
use crate::schema::FullArraySchemaData;

/// Key of the schema text slot in an operations map
pub const SCHEMA_TEXT: &str = "schemaText";

/// Operations keyed by field category, as handed to change propagation
pub type OperationsMap = Map<String, Value>;

/// A single change of one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiffOp<T> {
    Add {
        #[serde(rename = "newvalue")]
        new: T,
    },
    Remove {
        #[serde(rename = "oldvalue")]
        old: T,
    },
    Change {
        #[serde(rename = "oldvalue")]
        old: T,
        #[serde(rename = "newvalue")]
        new: T,
    },
}

impl<T: Clone> DiffOp<T> {
    /// Classify a transition between two optional values; `None` when unchanged
    pub fn between(old: Option<&T>, new: Option<&T>) -> Option<Self>
    where
        T: PartialEq,
    {
        match (old, new) {
            (None, None) => None,
            (None, Some(new)) => Some(DiffOp::Add { new: new.clone() }),
            (Some(old), None) => Some(DiffOp::Remove { old: old.clone() }),
            (Some(old), Some(new)) if old == new => None,
            (Some(old), Some(new)) => Some(DiffOp::Change {
                old: old.clone(),
                new: new.clone(),
            }),
        }
    }

    pub fn old_value(&self) -> Option<&T> {
        match self {
            DiffOp::Add { .. } => None,
            DiffOp::Remove { old } | DiffOp::Change { old, .. } => Some(old),
        }
    }

    pub fn new_value(&self) -> Option<&T> {
        match self {
            DiffOp::Remove { .. } => None,
            DiffOp::Add { new } | DiffOp::Change { new, .. } => Some(new),
        }
    }

    /// The operation that undoes this one
    pub fn reverse(&self) -> Self {
        match self {
            DiffOp::Add { new } => DiffOp::Remove { old: new.clone() },
            DiffOp::Remove { old } => DiffOp::Add { new: old.clone() },
            DiffOp::Change { old, new } => DiffOp::Change {
                old: new.clone(),
                new: old.clone(),
            },
        }
    }
}

/// Field-level changes between two revisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, DiffOp<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, DiffOp<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, DiffOp<Vec<String>>>,
    #[serde(rename = "schemaText", default, skip_serializing_if = "Option::is_none")]
    pub schema_text: Option<DiffOp<String>>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.descriptions.is_empty()
            && self.aliases.is_empty()
            && self.schema_text.is_none()
    }

    /// Number of individual operations
    pub fn len(&self) -> usize {
        self.labels.len()
            + self.descriptions.len()
            + self.aliases.len()
            + usize::from(self.schema_text.is_some())
    }

    /// The diff that turns the new side back into the old side
    pub fn reverse(&self) -> Self {
        Self {
            labels: reverse_map(&self.labels),
            descriptions: reverse_map(&self.descriptions),
            aliases: reverse_map(&self.aliases),
            schema_text: self.schema_text.as_ref().map(DiffOp::reverse),
        }
    }

    /// Operations keyed by category; categories without changes are left out
    pub fn operations(&self) -> OperationsMap {
        let mut operations = Map::new();
        insert_category(&mut operations, LABELS, &self.labels);
        insert_category(&mut operations, DESCRIPTIONS, &self.descriptions);
        insert_category(&mut operations, ALIASES, &self.aliases);
        if let Some(op) = &self.schema_text {
            operations.insert(SCHEMA_TEXT.to_string(), op.to_json());
        }
        operations
    }
}

impl<T: Clone + Into<Value>> DiffOp<T> {
    /// `{"type": ..., "oldvalue": ..., "newvalue": ...}`
    pub fn to_json(&self) -> Value {
        match self {
            DiffOp::Add { new } => json!({ "type": "add", "newvalue": new.clone().into() }),
            DiffOp::Remove { old } => json!({ "type": "remove", "oldvalue": old.clone().into() }),
            DiffOp::Change { old, new } => json!({
                "type": "change",
                "oldvalue": old.clone().into(),
                "newvalue": new.clone().into(),
            }),
        }
    }
}

fn insert_category<T: Clone + Into<Value>>(
    operations: &mut OperationsMap,
    key: &str,
    ops: &BTreeMap<String, DiffOp<T>>,
) {
    if ops.is_empty() {
        return;
    }
    let category: Map<String, Value> = ops.iter().map(|(lang, op)| (lang.clone(), op.to_json())).collect();
    operations.insert(key.to_string(), Value::Object(category));
}

fn reverse_map<T: Clone>(map: &BTreeMap<String, DiffOp<T>>) -> BTreeMap<String, DiffOp<T>> {
    map.iter().map(|(k, op)| (k.clone(), op.reverse())).collect()
}

fn diff_map<T: Clone + PartialEq>(
    old: &BTreeMap<String, T>,
    new: &BTreeMap<String, T>,
) -> BTreeMap<String, DiffOp<T>> {
    let languages: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    languages
        .into_iter()
        .filter_map(|lang| DiffOp::between(old.get(lang), new.get(lang)).map(|op| (lang.clone(), op)))
        .collect()
}

fn non_empty(text: &String) -> Option<&String> {
    (!text.is_empty()).then_some(text)
}

/// Computes [`SchemaDiff`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySchemaDiffer;

impl EntitySchemaDiffer {
    pub fn new() -> Self {
        Self
    }

    pub fn diff_schemas(&self, from: &FullArraySchemaData, to: &FullArraySchemaData) -> SchemaDiff {
        SchemaDiff {
            labels: diff_map(&from.labels, &to.labels),
            descriptions: diff_map(&from.descriptions, &to.descriptions),
            aliases: diff_map(&from.aliases, &to.aliases),
            schema_text: DiffOp::between(non_empty(&from.schema_text), non_empty(&to.schema_text)),
        }
    }

    /// Diff two raw page contents of any layout
    pub fn diff_contents(&self, old_raw: &str, new_raw: &str) -> Result<SchemaDiff> {
        let converter = SchemaConverter::new();
        Ok(self.diff_schemas(
            &converter.get_full_array_schema_data(old_raw)?,
            &converter.get_full_array_schema_data(new_raw)?,
        ))
    }

    /// Operations map between two raw page contents
    pub fn diff_operations(&self, old_raw: &str, new_raw: &str) -> Result<OperationsMap> {
        Ok(self.diff_contents(old_raw, new_raw)?.operations())
    }
}

/// Line-based unified diff of two schema texts, for display
pub fn schema_text_unified_diff(old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header("old", "new")
        .to_string()
}
