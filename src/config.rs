//! Configuration management for EntitySchema
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (entityschema.toml)
//! - Environment variables (ENTITYSCHEMA__*)
//!
//! ## Example config file (entityschema.toml):
//! ```toml
//! [repo]
//! enabled = true
//! namespace = "EntitySchema"
//! concept_base_uri = "http://www.wikidata.org/entity/"
//!
//! [limits]
//! schema_text_max_size_bytes = 50000
//! name_badge_max_size_chars = 250
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySchemaConfig {
    #[serde(default)]
    pub repo: RepoConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Repository integration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Whether EntitySchemas are exposed as Wikibase pseudo-entities
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Namespace prefix of schema page titles
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Base URI of entity concepts (used for RDF values)
    #[serde(default)]
    pub concept_base_uri: Option<String>,
}

/// Input size limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_schema_text_max_size_bytes")]
    pub schema_text_max_size_bytes: usize,

    #[serde(default = "default_name_badge_max_size_chars")]
    pub name_badge_max_size_chars: usize,
}

/// CLI output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "EntitySchema".to_string()
}

fn default_schema_text_max_size_bytes() -> usize {
    50_000
}

fn default_name_badge_max_size_chars() -> usize {
    250
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: default_namespace(),
            concept_base_uri: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            schema_text_max_size_bytes: default_schema_text_max_size_bytes(),
            name_badge_max_size_chars: default_name_badge_max_size_chars(),
        }
    }
}

impl EntitySchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "entityschema.toml",
            ".entityschema.toml",
            "config/entityschema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "wikibase", "entityschema") {
            let xdg_config = config_dir.config_dir().join("entityschema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ENTITYSCHEMA__LIMITS__SCHEMA_TEXT_MAX_SIZE_BYTES=1000
        builder = builder.add_source(
            Environment::with_prefix("ENTITYSCHEMA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
