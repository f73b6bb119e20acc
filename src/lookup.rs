//! Term lookup and pseudo-entity access for Wikibase consumers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RepoConfig;
use crate::converter::SchemaConverter;
use crate::error::Result;
use crate::id::{EntitySchemaId, ENTITY_TYPE};
use crate::schema::FullArraySchemaData;
use crate::store::PageStore;

/// Labels and descriptions of stored schemas.
///
/// Pages that are missing or unreadable have no terms.
pub struct EntitySchemaTermLookup<'a, S: PageStore> {
    store: &'a S,
    converter: SchemaConverter,
}

impl<'a, S: PageStore> EntitySchemaTermLookup<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            converter: SchemaConverter::new(),
        }
    }

    pub fn get_label(&self, id: &EntitySchemaId, language: &str) -> Result<Option<String>> {
        Ok(self
            .load_schema_data(id)?
            .and_then(|mut data| data.labels.remove(language)))
    }

    pub fn get_labels(&self, id: &EntitySchemaId, languages: &[&str]) -> Result<BTreeMap<String, String>> {
        Ok(self
            .load_schema_data(id)?
            .map(|data| pick(data.labels, languages))
            .unwrap_or_default())
    }

    pub fn get_description(&self, id: &EntitySchemaId, language: &str) -> Result<Option<String>> {
        Ok(self
            .load_schema_data(id)?
            .and_then(|mut data| data.descriptions.remove(language)))
    }

    pub fn get_descriptions(&self, id: &EntitySchemaId, languages: &[&str]) -> Result<BTreeMap<String, String>> {
        Ok(self
            .load_schema_data(id)?
            .map(|data| pick(data.descriptions, languages))
            .unwrap_or_default())
    }

    fn load_schema_data(&self, id: &EntitySchemaId) -> Result<Option<FullArraySchemaData>> {
        let Some(content) = self.store.load_content(id)? else {
            return Ok(None);
        };
        match self.converter.get_full_array_schema_data(&content) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                tracing::warn!(%id, error = %e, "stored schema is unreadable");
                Ok(None)
            }
        }
    }
}

fn pick(mut terms: BTreeMap<String, String>, languages: &[&str]) -> BTreeMap<String, String> {
    languages
        .iter()
        .filter_map(|lang| terms.remove_entry(*lang))
        .collect()
}

/// A hit of an ID search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    /// Label in the requested language, if there is one
    pub label: Option<String>,
}

/// Answers Wikibase's pseudo-entity questions about EntitySchemas
pub struct PseudoEntityHandler<'a, S: PageStore> {
    store: &'a S,
    repo: RepoConfig,
}

impl<'a, S: PageStore> PseudoEntityHandler<'a, S> {
    pub fn new(store: &'a S, repo: RepoConfig) -> Self {
        Self { store, repo }
    }

    pub fn handles(&self, entity_type: &str) -> bool {
        self.repo.enabled && entity_type == ENTITY_TYPE
    }

    pub fn parse_id(&self, serialization: &str) -> Result<EntitySchemaId> {
        EntitySchemaId::new(serialization)
    }

    /// Page title, e.g. `EntitySchema:E1`
    pub fn page_title(&self, id: &EntitySchemaId) -> String {
        format!("{}:{}", self.repo.namespace, id)
    }

    pub fn entity_exists(&self, id: &EntitySchemaId) -> Result<bool> {
        self.store.exists(id)
    }

    /// Wikibase-style entity array of a stored schema
    pub fn load_pseudo_entity_array(&self, id: &EntitySchemaId) -> Result<Option<Value>> {
        match self.store.load_content(id)? {
            Some(content) => SchemaConverter::new()
                .get_full_wikibase_array_schema_data(&content)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Exact ID search; anything that is not an existing ID finds nothing
    pub fn search_entities(&self, search: &str, language: &str) -> Result<Vec<SearchResult>> {
        let Ok(id) = self.parse_id(search.trim()) else {
            return Ok(Vec::new());
        };
        if !self.entity_exists(&id)? {
            return Ok(Vec::new());
        }

        let label = EntitySchemaTermLookup::new(self.store).get_label(&id, language)?;
        Ok(vec![SearchResult {
            id: id.to_string(),
            title: self.page_title(&id),
            label,
        }])
    }
}
