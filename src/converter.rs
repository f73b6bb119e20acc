//! Conversion of stored documents into read views
//!
//! Every entry point takes the raw page content, so callers never need to
//! know which `serializationVersion` a page was saved with.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::format::StoredDocument;
use crate::id::ENTITY_TYPE;
use crate::schema::{
    FullArraySchemaData, FullViewSchemaData, MonolingualSchemaData, NameBadge, PersistenceSchemaData,
};

/// Converts raw EntitySchema page content into normalized views
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter;

impl SchemaConverter {
    pub fn new() -> Self {
        Self
    }

    /// Name badges for every language present, plus empty badges for
    /// `preferred_languages` that have no terms yet
    pub fn get_full_view_schema_data(
        &self,
        raw: &str,
        preferred_languages: &[&str],
    ) -> Result<FullViewSchemaData> {
        let mut view = self.get_full_array_schema_data(raw)?.to_full_view();
        for language in preferred_languages {
            view.name_badges.entry((*language).to_string()).or_default();
        }
        Ok(view)
    }

    /// Per-field maps; undefined terms are absent
    pub fn get_full_array_schema_data(&self, raw: &str) -> Result<FullArraySchemaData> {
        StoredDocument::parse(raw)?.read()
    }

    /// Terms in one language; a language without terms yields an empty badge
    pub fn get_monolingual_name_badge_data(&self, raw: &str, language: &str) -> Result<NameBadge> {
        Ok(self.get_full_array_schema_data(raw)?.name_badge(language))
    }

    pub fn get_monolingual_schema_data(&self, raw: &str, language: &str) -> Result<MonolingualSchemaData> {
        let data = self.get_full_array_schema_data(raw)?;
        Ok(MonolingualSchemaData {
            name_badge: data.name_badge(language),
            schema_text: data.schema_text,
        })
    }

    pub fn get_schema_text(&self, raw: &str) -> Result<String> {
        Ok(self.get_full_array_schema_data(raw)?.schema_text)
    }

    /// The stored `id`, without normalizing anything else
    pub fn get_schema_id(&self, raw: &str) -> Result<Option<String>> {
        Ok(StoredDocument::parse(raw)?.id)
    }

    pub fn get_persistence_schema_data(&self, raw: &str) -> Result<PersistenceSchemaData> {
        let document = StoredDocument::parse(raw)?;
        Ok(PersistenceSchemaData {
            data: document.read()?,
            id: document.id,
            version: document.version,
        })
    }

    /// Wikibase-style entity array, as served to pseudo-entity consumers
    pub fn get_full_wikibase_array_schema_data(&self, raw: &str) -> Result<Value> {
        let document = StoredDocument::parse(raw)?;
        let data = document.read()?;

        let terms = |map: &std::collections::BTreeMap<String, String>| -> Map<String, Value> {
            map.iter()
                .map(|(lang, value)| (lang.clone(), json!({ "language": lang, "value": value })))
                .collect()
        };
        let aliases: Map<String, Value> = data
            .aliases
            .iter()
            .map(|(lang, group)| {
                let values: Vec<Value> = group
                    .iter()
                    .map(|alias| json!({ "language": lang, "value": alias }))
                    .collect();
                (lang.clone(), Value::Array(values))
            })
            .collect();

        Ok(json!({
            "id": document.id,
            "type": ENTITY_TYPE,
            "labels": terms(&data.labels),
            "descriptions": terms(&data.descriptions),
            "aliases": aliases,
        }))
    }
}
