//! Writing EntitySchema documents
//!
//! Writers always emit the latest layout with every map in key order, so the
//! same data always produces the same bytes. Only the terms an edit supplies
//! are cleaned and checked; everything read from storage is written back as is.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::converter::SchemaConverter;
use crate::error::{Result, SchemaError};
use crate::format::SCHEMA_TYPE_SHEXC;
use crate::id::EntitySchemaId;
use crate::schema::{FullArraySchemaData, NameBadge};
use crate::validation::is_valid_language_code;
use crate::version::SerializationVersion;

/// Normalizes user-supplied terms before they are stored
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCleaner;

impl SchemaCleaner {
    /// Trim terms, drop empty ones, drop empty and repeated aliases
    pub fn clean_name_badge(badge: NameBadge) -> NameBadge {
        NameBadge {
            label: badge.label.trim().to_string(),
            description: badge.description.trim().to_string(),
            aliases: Self::clean_aliases(badge.aliases),
        }
    }

    pub fn clean_aliases(aliases: Vec<String>) -> Vec<String> {
        let mut cleaned: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let alias = alias.trim();
            if !alias.is_empty() && !cleaned.iter().any(|seen| seen == alias) {
                cleaned.push(alias.to_string());
            }
        }
        cleaned
    }

    /// Clean every language of a full document; the schema text is kept as is
    pub fn clean_data(data: &FullArraySchemaData) -> FullArraySchemaData {
        let mut cleaned = FullArraySchemaData {
            schema_text: data.schema_text.clone(),
            ..Default::default()
        };
        for language in data.languages() {
            cleaned.set_name_badge(language, Self::clean_name_badge(data.name_badge(language)));
        }
        cleaned
    }
}

#[derive(Serialize)]
struct PersistedDocument<'a> {
    id: &'a str,
    #[serde(rename = "serializationVersion")]
    serialization_version: &'static str,
    labels: &'a BTreeMap<String, String>,
    descriptions: &'a BTreeMap<String, String>,
    aliases: &'a BTreeMap<String, Vec<String>>,
    #[serde(rename = "schemaText")]
    schema_text: &'a str,
    #[serde(rename = "type")]
    schema_type: &'static str,
}

/// Produces stored page content
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySchemaEncoder;

impl EntitySchemaEncoder {
    /// Serialize a whole schema in the latest layout, exactly as given
    pub fn get_persistent_representation(id: &EntitySchemaId, data: &FullArraySchemaData) -> Result<String> {
        let document = PersistedDocument {
            id: id.serialization(),
            serialization_version: SerializationVersion::latest().as_str(),
            labels: &data.labels,
            descriptions: &data.descriptions,
            aliases: &data.aliases,
            schema_text: &data.schema_text,
            schema_type: SCHEMA_TYPE_SHEXC,
        };
        Ok(serde_json::to_string(&document)?)
    }

    /// Replace the terms of one language, keeping every other language and the schema text
    pub fn replace_name_badge(
        existing: &str,
        id: &EntitySchemaId,
        language: &str,
        badge: NameBadge,
    ) -> Result<String> {
        let mut data = SchemaConverter::new().get_full_array_schema_data(existing)?;
        // stored languages are kept even when they would not pass as new input
        if !data.languages().contains(language) && !is_valid_language_code(language) {
            return Err(SchemaError::InvalidInput(format!(
                "invalid language code {:?}",
                language
            )));
        }
        data.set_name_badge(language, SchemaCleaner::clean_name_badge(badge));
        Self::get_persistent_representation(id, &data)
    }

    /// Replace the schema text, keeping all terms
    pub fn replace_schema_text(existing: &str, id: &EntitySchemaId, schema_text: &str) -> Result<String> {
        let mut data = SchemaConverter::new().get_full_array_schema_data(existing)?;
        data.schema_text = schema_text.to_string();
        Self::get_persistent_representation(id, &data)
    }

    /// Re-encode a stored document of any layout in the latest layout
    pub fn upgrade(raw: &str) -> Result<String> {
        let persisted = SchemaConverter::new().get_persistence_schema_data(raw)?;
        let id = persisted
            .id
            .ok_or_else(|| SchemaError::InvalidFormat("document has no id".to_string()))?;
        let id = EntitySchemaId::new(id)?;
        if !persisted.version.is_latest() {
            tracing::debug!(%id, from = %persisted.version, "upgrading stored document");
        }
        Self::get_persistent_representation(&id, &persisted.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> EntitySchemaId {
        EntitySchemaId::new("E1").unwrap()
    }

    #[test]
    fn test_cleaner() {
        let badge = SchemaCleaner::clean_name_badge(NameBadge::new(
            "  label ",
            " ",
            vec![" a".into(), "".into(), "a".into(), "b ".into()],
        ));
        assert_eq!(badge, NameBadge::new("label", "", vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_persistent_representation_is_deterministic() {
        let mut data = FullArraySchemaData::default();
        data.labels.insert("en".into(), "human".into());
        data.labels.insert("de".into(), "Mensch".into());
        data.schema_text = "<human> {}".into();

        let encoded = EntitySchemaEncoder::get_persistent_representation(&id(), &data).unwrap();
        assert_eq!(
            encoded,
            r#"{"id":"E1","serializationVersion":"3.0","labels":{"de":"Mensch","en":"human"},"descriptions":{},"aliases":{},"schemaText":"<human> {}","type":"ShExC"}"#
        );
    }

    #[test]
    fn test_invalid_new_language_code_rejected() {
        let existing = r#"{"id":"E1","serializationVersion":"3.0","labels":{"en":"human"}}"#;
        let result = EntitySchemaEncoder::replace_name_badge(existing, &id(), "EN GB", NameBadge::new("x", "", vec![]));
        assert!(matches!(result, Err(SchemaError::InvalidInput(_))));
    }

    #[test]
    fn test_stored_language_code_can_be_replaced() {
        let existing = r#"{"id":"E1","serializationVersion":"3.0","labels":{"de-CH":"Mänsch"}}"#;
        let updated =
            EntitySchemaEncoder::replace_name_badge(existing, &id(), "de-CH", NameBadge::new("Mensch", "", vec![]))
                .unwrap();
        let data = SchemaConverter::new().get_full_array_schema_data(&updated).unwrap();
        assert_eq!(data.labels["de-CH"], "Mensch");
    }

    #[test]
    fn test_replace_keeps_other_languages_verbatim() {
        let existing = r#"{"id":"E1","serializationVersion":"3.0","labels":{"en":" human "},"aliases":{"en":["a","a"]},"schemaText":"x"}"#;
        let before = SchemaConverter::new().get_full_array_schema_data(existing).unwrap();

        let updated =
            EntitySchemaEncoder::replace_name_badge(existing, &id(), "de", NameBadge::new(" Mensch ", "", vec![]))
                .unwrap();
        let after = SchemaConverter::new().get_full_array_schema_data(&updated).unwrap();

        assert_eq!(after.name_badge("en"), before.name_badge("en"));
        assert_eq!(after.labels["en"], " human ");
        assert_eq!(after.aliases["en"], vec!["a", "a"]);
        // only the supplied badge is cleaned
        assert_eq!(after.labels["de"], "Mensch");

        let retexted = EntitySchemaEncoder::replace_schema_text(existing, &id(), "y").unwrap();
        let after = SchemaConverter::new().get_full_array_schema_data(&retexted).unwrap();
        assert_eq!(after.aliases, before.aliases);
        assert_eq!(after.labels, before.labels);
    }

    #[test]
    fn test_clean_data() {
        let mut data = FullArraySchemaData::default();
        data.labels.insert("en".into(), " human ".into());
        data.descriptions.insert("de".into(), "  ".into());
        data.aliases.insert("en".into(), vec!["a".into(), " a".into()]);
        data.schema_text = " text ".into();

        let cleaned = SchemaCleaner::clean_data(&data);
        assert_eq!(cleaned.labels["en"], "human");
        assert!(cleaned.descriptions.is_empty());
        assert_eq!(cleaned.aliases["en"], vec!["a"]);
        assert_eq!(cleaned.schema_text, " text ");
    }

    #[test]
    fn test_replace_name_badge_keeps_other_languages() {
        let existing = r#"{"id":"E1","serializationVersion":"3.0","labels":{"en":"human","de":"Mensch"},"schemaText":"x"}"#;
        let updated = EntitySchemaEncoder::replace_name_badge(
            existing,
            &id(),
            "de",
            NameBadge::new("Person", "ein Mensch", vec![]),
        )
        .unwrap();

        let data = SchemaConverter::new().get_full_array_schema_data(&updated).unwrap();
        assert_eq!(data.labels["en"], "human");
        assert_eq!(data.labels["de"], "Person");
        assert_eq!(data.descriptions["de"], "ein Mensch");
        assert_eq!(data.schema_text, "x");
    }

    #[test]
    fn test_upgrade_from_v1() {
        let legacy = r#"{"id":"E3","serializationVersion":"1.0","labels":{"en":{"language":"en","value":"cat"}},"schema":"<cat> {}","type":"ShExC"}"#;
        let upgraded = EntitySchemaEncoder::upgrade(legacy).unwrap();
        assert!(upgraded.contains(r#""serializationVersion":"3.0""#));
        assert!(upgraded.contains(r#""schemaText":"<cat> {}""#));
        assert!(upgraded.contains(r#""labels":{"en":"cat"}"#));
    }

    #[test]
    fn test_upgrade_keeps_unusual_language_codes() {
        let legacy = r#"{"id":"E3","serializationVersion":"2.0","labels":{"zh-classical":"貓","de-CH":"Chatz"},"schema":"<cat> {}"}"#;
        let upgraded = EntitySchemaEncoder::upgrade(legacy).unwrap();
        let data = SchemaConverter::new().get_full_array_schema_data(&upgraded).unwrap();
        assert_eq!(data.labels["zh-classical"], "貓");
        assert_eq!(data.labels["de-CH"], "Chatz");
    }

    #[test]
    fn test_upgrade_requires_id() {
        assert!(matches!(
            EntitySchemaEncoder::upgrade(r#"{"serializationVersion":"3.0"}"#),
            Err(SchemaError::InvalidFormat(_))
        ));
    }
}
