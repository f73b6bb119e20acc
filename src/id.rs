//! EntitySchema identifiers (`E1`, `E42`, ...)

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SchemaError};

/// Entity type reported to Wikibase for EntitySchema pseudo-entities
pub const ENTITY_TYPE: &str = "entityschema";

/// Highest numeric part an ID may carry (32-bit signed maximum)
pub const MAX_NUMERIC_ID: i32 = i32::MAX;

/// An immutable, validated EntitySchema ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntitySchemaId {
    id: String,
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EntitySchemaId::PATTERN).unwrap())
}

impl EntitySchemaId {
    /// Pattern every serialization must match
    pub const PATTERN: &'static str = r"^E[1-9][0-9]*$";

    /// Validate and wrap an ID serialization
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !id_pattern().is_match(&id) {
            return Err(SchemaError::InvalidId {
                reason: format!("ID must match {}", Self::PATTERN),
                id,
            });
        }

        // The pattern guarantees digits only, so a failed parse is an overflow.
        if id[1..].parse::<i32>().is_err() {
            return Err(SchemaError::InvalidId {
                reason: format!("ID can not exceed {}", MAX_NUMERIC_ID),
                id,
            });
        }

        Ok(Self { id })
    }

    /// Build an ID from its numeric part
    pub fn from_numeric(numeric_id: u32) -> Result<Self> {
        Self::new(format!("E{}", numeric_id))
    }

    /// Canonical string form
    pub fn serialization(&self) -> &str {
        &self.id
    }

    /// The integer after the `E` prefix
    pub fn numeric_id(&self) -> i32 {
        // Validated on construction.
        self.id[1..].parse().unwrap_or_default()
    }

    pub fn entity_type(&self) -> &'static str {
        ENTITY_TYPE
    }

    /// Restore an ID from persisted state, rejecting any drift in the serialization
    pub fn from_serialized(serialization: &str) -> Result<Self> {
        let id = Self::new(serialization)?;
        if id.serialization() != serialization {
            return Err(SchemaError::InvalidId {
                id: serialization.to_string(),
                reason: "data contained invalid serialization".to_string(),
            });
        }
        Ok(id)
    }
}

impl fmt::Display for EntitySchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for EntitySchemaId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for EntitySchemaId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// Persisted shape: `{"serialization": "E1"}`
#[derive(Serialize, Deserialize)]
struct SerializedId {
    serialization: String,
}

impl Serialize for EntitySchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SerializedId {
            serialization: self.id.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntitySchemaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = SerializedId::deserialize(deserializer)?;
        EntitySchemaId::from_serialized(&data.serialization).map_err(serde::de::Error::custom)
    }
}
