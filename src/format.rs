//! Stored document layouts and their readers
//!
//! A stored EntitySchema is a JSON object whose `serializationVersion` selects
//! how the terms and the schema text are laid out:
//!
//! ```text
//! 1.0  {"labels": {"en": {"language": "en", "value": "human"}},
//!       "aliases": {"en": [{"language": "en", "value": "person"}]},
//!       "schema": "<ShExC>"}
//! 2.0  {"labels": {"en": "human"}, "aliases": {"en": ["person"]},
//!       "schema": "<ShExC>"}
//! 3.0  {"labels": {"en": "human"}, "aliases": {"en": ["person"]},
//!       "schemaText": "<ShExC>"}
//! ```
//!
//! Each layout has one [`DocumentReader`]; all of them produce the same
//! [`FullArraySchemaData`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::schema::FullArraySchemaData;
use crate::version::SerializationVersion;

/// Key of the label container
pub const LABELS: &str = "labels";
/// Key of the description container
pub const DESCRIPTIONS: &str = "descriptions";
/// Key of the alias container
pub const ALIASES: &str = "aliases";
/// Key of the version tag
pub const SERIALIZATION_VERSION: &str = "serializationVersion";
/// Value of the `type` key
pub const SCHEMA_TYPE_SHEXC: &str = "ShExC";

/// A parsed, not yet normalized stored document
#[derive(Debug, Clone, Default)]
pub struct StoredDocument {
    pub id: Option<String>,
    pub version: SerializationVersion,
    object: Map<String, Value>,
}

impl StoredDocument {
    /// Parse raw page content. Empty content is a never-saved schema.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(raw)
            .map_err(|e| SchemaError::UnreadableSchemaData(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(SchemaError::UnreadableSchemaData(
                "top-level value is not a JSON object".to_string(),
            ));
        };

        let version = SerializationVersion::parse(
            object.get(SERIALIZATION_VERSION).and_then(Value::as_str),
        );
        let id = object.get("id").and_then(Value::as_str).map(String::from);

        Ok(Self { id, version, object })
    }

    /// Normalize with the reader for this document's version
    pub fn read(&self) -> Result<FullArraySchemaData> {
        reader_for(self.version).read(&self.object)
    }
}

/// Reads one stored layout into the normalized view
pub trait DocumentReader {
    fn version(&self) -> SerializationVersion;

    fn read(&self, object: &Map<String, Value>) -> Result<FullArraySchemaData>;
}

/// Select the reader for a layout
pub fn reader_for(version: SerializationVersion) -> &'static dyn DocumentReader {
    match version {
        SerializationVersion::V1 => &V1_READER,
        SerializationVersion::V2 => &V2_READER,
        SerializationVersion::V3 => &V3_READER,
    }
}

static V1_READER: NestedTermsReader = NestedTermsReader;
static V2_READER: FlatTermsReader = FlatTermsReader {
    version: SerializationVersion::V2,
};
static V3_READER: FlatTermsReader = FlatTermsReader {
    version: SerializationVersion::V3,
};

/// Layout 1.0 (and untagged documents)
struct NestedTermsReader;

impl DocumentReader for NestedTermsReader {
    fn version(&self) -> SerializationVersion {
        SerializationVersion::V1
    }

    fn read(&self, object: &Map<String, Value>) -> Result<FullArraySchemaData> {
        Ok(FullArraySchemaData {
            labels: read_terms(object, LABELS, TermShape::Nested)?,
            descriptions: read_terms(object, DESCRIPTIONS, TermShape::Nested)?,
            aliases: read_alias_groups(object, TermShape::Nested)?,
            schema_text: read_schema_text(object, &schema_text_keys(SerializationVersion::V1))?,
        })
    }
}

/// Layouts 2.0 and 3.0
struct FlatTermsReader {
    version: SerializationVersion,
}

impl DocumentReader for FlatTermsReader {
    fn version(&self) -> SerializationVersion {
        self.version
    }

    fn read(&self, object: &Map<String, Value>) -> Result<FullArraySchemaData> {
        Ok(FullArraySchemaData {
            labels: read_terms(object, LABELS, TermShape::Flat)?,
            descriptions: read_terms(object, DESCRIPTIONS, TermShape::Flat)?,
            aliases: read_alias_groups(object, TermShape::Flat)?,
            schema_text: read_schema_text(object, &schema_text_keys(self.version))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermShape {
    /// `{"language": "en", "value": "..."}`, bare strings tolerated
    Nested,
    /// bare strings
    Flat,
}

fn term_text(value: &Value, shape: TermShape) -> Option<&str> {
    match (value, shape) {
        (Value::String(s), _) => Some(s),
        (Value::Object(o), TermShape::Nested) => o.get("value").and_then(Value::as_str),
        _ => None,
    }
}

/// Look up a per-language container. PHP encodes an empty map as `[]`.
fn container<'a>(object: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(other) => Err(SchemaError::InvalidFormat(format!(
            "'{}' must be an object, got {}",
            key, other
        ))),
    }
}

fn read_terms(object: &Map<String, Value>, key: &str, shape: TermShape) -> Result<BTreeMap<String, String>> {
    let mut terms = BTreeMap::new();
    let Some(map) = container(object, key)? else {
        return Ok(terms);
    };

    for (language, value) in map {
        match term_text(value, shape) {
            Some("") => {}
            Some(text) => {
                terms.insert(language.clone(), text.to_string());
            }
            None => tracing::warn!(key, language = %language, "skipping malformed term"),
        }
    }
    Ok(terms)
}

fn read_alias_groups(object: &Map<String, Value>, shape: TermShape) -> Result<BTreeMap<String, Vec<String>>> {
    let mut groups = BTreeMap::new();
    let Some(map) = container(object, ALIASES)? else {
        return Ok(groups);
    };

    for (language, value) in map {
        let Value::Array(items) = value else {
            tracing::warn!(language = %language, "skipping malformed alias group");
            continue;
        };
        let aliases: Vec<String> = items
            .iter()
            .filter_map(|item| term_text(item, shape))
            .filter(|alias| !alias.is_empty())
            .map(String::from)
            .collect();
        if !aliases.is_empty() {
            groups.insert(language.clone(), aliases);
        }
    }
    Ok(groups)
}

/// The layout's own schema text key, then the latest layout's key
fn schema_text_keys(version: SerializationVersion) -> Vec<&'static str> {
    let own = version.schema_text_key();
    let latest = SerializationVersion::latest().schema_text_key();
    if own == latest {
        vec![own]
    } else {
        vec![own, latest]
    }
}

fn read_schema_text(object: &Map<String, Value>, keys: &[&str]) -> Result<String> {
    for key in keys {
        match object.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(text)) => return Ok(text.clone()),
            Some(other) => {
                return Err(SchemaError::InvalidFormat(format!(
                    "'{}' must be a string, got {}",
                    key, other
                )))
            }
        }
    }
    Ok(String::new())
}
