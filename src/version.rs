//! Serialization versions of stored EntitySchema documents

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `serializationVersion` tag of a stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SerializationVersion {
    /// Terms as `{"language", "value"}` objects, schema text under `schema`
    #[serde(rename = "1.0")]
    V1,
    /// Flat terms, schema text under `schema`
    #[serde(rename = "2.0")]
    V2,
    /// Flat terms, schema text under `schemaText`
    #[serde(rename = "3.0")]
    V3,
}

impl SerializationVersion {
    /// All versions a reader understands, oldest first
    pub const ALL: [SerializationVersion; 3] = [Self::V1, Self::V2, Self::V3];

    /// Resolve a version tag; absent or unknown tags read as the oldest format
    pub fn parse(tag: Option<&str>) -> Self {
        match tag {
            Some("1.0") => Self::V1,
            Some("2.0") => Self::V2,
            Some("3.0") => Self::V3,
            Some(other) => {
                tracing::debug!(tag = other, "unknown serializationVersion, reading as 1.0");
                Self::V1
            }
            None => Self::V1,
        }
    }

    /// The version every writer emits
    pub fn latest() -> Self {
        Self::V3
    }

    /// Tag string as stored in `serializationVersion`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }

    /// Key holding the schema text in this layout
    pub fn schema_text_key(&self) -> &'static str {
        match self {
            Self::V1 | Self::V2 => "schema",
            Self::V3 => "schemaText",
        }
    }

    pub fn is_latest(&self) -> bool {
        *self == Self::latest()
    }
}

impl Default for SerializationVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for SerializationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
