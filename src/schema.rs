//! Normalized views of an EntitySchema document

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::version::SerializationVersion;

/// Label, description and aliases of a schema in one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBadge {
    pub label: String,
    pub description: String,
    pub aliases: Vec<String>,
}

impl NameBadge {
    pub fn new(label: impl Into<String>, description: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            aliases,
        }
    }

    /// True when no term is defined
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.description.is_empty() && self.aliases.is_empty()
    }
}

/// Every name badge of a schema, keyed by language code, plus the schema text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullViewSchemaData {
    pub name_badges: BTreeMap<String, NameBadge>,
    pub schema_text: String,
}

/// One language's name badge plus the schema text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonolingualSchemaData {
    pub name_badge: NameBadge,
    pub schema_text: String,
}

/// The full data of a schema as per-field maps.
///
/// Labels, descriptions and aliases are absent in languages where they are not
/// defined; an empty string or empty alias list is never stored. The schema
/// text is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullArraySchemaData {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(rename = "schemaText", default)]
    pub schema_text: String,
}

impl FullArraySchemaData {
    /// Every language with at least one defined term, sorted
    pub fn languages(&self) -> BTreeSet<&str> {
        self.labels
            .keys()
            .chain(self.descriptions.keys())
            .chain(self.aliases.keys())
            .map(String::as_str)
            .collect()
    }

    /// Name badge for a language; undefined terms come back empty
    pub fn name_badge(&self, language: &str) -> NameBadge {
        NameBadge {
            label: self.labels.get(language).cloned().unwrap_or_default(),
            description: self.descriptions.get(language).cloned().unwrap_or_default(),
            aliases: self.aliases.get(language).cloned().unwrap_or_default(),
        }
    }

    /// Replace one language's terms; empty terms become undefined
    pub fn set_name_badge(&mut self, language: &str, badge: NameBadge) {
        set_or_remove(&mut self.labels, language, badge.label);
        set_or_remove(&mut self.descriptions, language, badge.description);
        if badge.aliases.is_empty() {
            self.aliases.remove(language);
        } else {
            self.aliases.insert(language.to_string(), badge.aliases);
        }
    }

    pub fn to_full_view(&self) -> FullViewSchemaData {
        FullViewSchemaData {
            name_badges: self
                .languages()
                .into_iter()
                .map(|lang| (lang.to_string(), self.name_badge(lang)))
                .collect(),
            schema_text: self.schema_text.clone(),
        }
    }
}

fn set_or_remove(map: &mut BTreeMap<String, String>, language: &str, value: String) {
    if value.is_empty() {
        map.remove(language);
    } else {
        map.insert(language.to_string(), value);
    }
}

/// Everything needed to write a document back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceSchemaData {
    /// The `id` stored in the document, if any
    pub id: Option<String>,
    /// Layout the document was read from
    pub version: SerializationVersion,
    pub data: FullArraySchemaData,
}
