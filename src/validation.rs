//! Input validation for user edits
//!
//! Checks run before anything is written:
//! 1. **Language codes**: lowercase BCP-47-like codes as used by MediaWiki
//!    (`en`, `de-formal`, `zh-min-nan`)
//! 2. **Name badge size**: label, description and every alias are limited in characters
//! 3. **Schema text size**: limited in bytes

use std::sync::OnceLock;

use regex::Regex;

use crate::config::LimitsConfig;
use crate::error::{Result, SchemaError};
use crate::schema::NameBadge;

const LANGUAGE_CODE_PATTERN: &str = r"^[a-z]{2,8}(-[a-z0-9]{1,12})*$";

fn language_code_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(LANGUAGE_CODE_PATTERN).unwrap())
}

/// Whether `code` looks like a MediaWiki language code
pub fn is_valid_language_code(code: &str) -> bool {
    language_code_regex().is_match(code)
}

/// Validates edit input against configured limits
#[derive(Debug, Clone)]
pub struct InputValidator {
    limits: LimitsConfig,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl InputValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn validate_language_code(&self, code: &str) -> Result<()> {
        if is_valid_language_code(code) {
            Ok(())
        } else {
            Err(SchemaError::InvalidInput(format!("invalid language code {:?}", code)))
        }
    }

    pub fn validate_schema_text_length(&self, schema_text: &str) -> Result<()> {
        let max = self.limits.schema_text_max_size_bytes;
        if schema_text.len() > max {
            return Err(SchemaError::InvalidInput(format!(
                "schema text is {} bytes, the limit is {}",
                schema_text.len(),
                max
            )));
        }
        Ok(())
    }

    /// Each term of the badge is checked on its own, counted in characters
    pub fn validate_name_badge(&self, badge: &NameBadge) -> Result<()> {
        self.validate_term_length("label", &badge.label)?;
        self.validate_term_length("description", &badge.description)?;
        for alias in &badge.aliases {
            self.validate_term_length("alias", alias)?;
        }
        Ok(())
    }

    fn validate_term_length(&self, kind: &str, value: &str) -> Result<()> {
        let max = self.limits.name_badge_max_size_chars;
        let length = value.chars().count();
        if length > max {
            return Err(SchemaError::InvalidInput(format!(
                "{} is {} characters, the limit is {}",
                kind, length, max
            )));
        }
        Ok(())
    }
}
