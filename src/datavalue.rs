//! EntitySchema IDs as Wikibase statement values

use serde::{Deserialize, Serialize};

use crate::config::RepoConfig;
use crate::error::{Result, SchemaError};
use crate::id::{EntitySchemaId, ENTITY_TYPE};
use crate::store::PageStore;

/// A statement value that may reference an EntitySchema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum DataValue {
    /// An entity ID value of any entity type
    WikibaseEntityid { entity_type: String, id: String },
    String(String),
    /// Any other value type, by name
    Other(String),
}

/// The EntitySchema ID referenced by a value
pub fn extract_entity_schema_id(value: &DataValue) -> Result<EntitySchemaId> {
    match value {
        DataValue::WikibaseEntityid { entity_type, id } if entity_type == ENTITY_TYPE => EntitySchemaId::new(id.as_str()),
        DataValue::WikibaseEntityid { entity_type, .. } => Err(SchemaError::WrongDataValue(format!(
            "wrong entity type: {}",
            entity_type
        ))),
        DataValue::String(serialization) => EntitySchemaId::new(serialization.as_str()),
        DataValue::Other(kind) => Err(SchemaError::WrongDataValue(format!("wrong data value type: {}", kind))),
    }
}

/// Concept URI of a referenced schema, if a concept base URI is configured
pub fn concept_uri(repo: &RepoConfig, id: &EntitySchemaId) -> Option<String> {
    repo.concept_base_uri
        .as_ref()
        .map(|base| format!("{}{}", base, id))
}

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub text: String,
    pub code: String,
    pub params: Vec<String>,
}

/// Outcome of validating a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks that a referenced EntitySchema page exists
pub struct EntitySchemaExistsValidator<'a, S: PageStore> {
    store: &'a S,
}

impl<'a, S: PageStore> EntitySchemaExistsValidator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn validate(&self, value: &DataValue) -> Result<ValidationResult> {
        let id = extract_entity_schema_id(value)?;
        if self.store.exists(&id)? {
            return Ok(ValidationResult::default());
        }
        Ok(ValidationResult {
            errors: vec![ValidationError {
                text: format!("EntitySchema not found: {}", id),
                code: "no-such-entity-schema".to_string(),
                params: vec![id.to_string()],
            }],
        })
    }
}
