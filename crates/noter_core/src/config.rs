//! Engine configuration.
//!
//! # Responsibility
//! - Hold the reserved property keys and session defaults.
//! - Load and validate JSON configuration documents.
//!
//! # Invariants
//! - A validated config has one distinct, non-blank key per property role.
//! - `default_split_fraction` lies strictly between 0 and 1.

use crate::model::entry::PropertyKeys;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Configuration consumed by sessions and the note source resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoterConfig {
    pub property_keys: PropertyKeys,
    pub default_split_fraction: f64,
    /// Note document shared by all node-like documents.
    pub node_notes_key: String,
    /// Appended to the document id, without extension, to name its notes.
    pub notes_suffix: String,
    /// Move the viewer to the persisted location when a session starts.
    pub resume_on_create: bool,
    /// Root heading title used when the adapter offers none.
    pub default_root_title: String,
}

impl Default for NoterConfig {
    fn default() -> Self {
        Self {
            property_keys: PropertyKeys::default(),
            default_split_fraction: 0.5,
            node_notes_key: "help-notes.org".to_string(),
            notes_suffix: ".notes.org".to_string(),
            resume_on_create: true,
            default_root_title: "Notes".to_string(),
        }
    }
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidSplitFraction(f64),
    BlankPropertyKey(&'static str),
    DuplicatePropertyKey(String),
    BlankNotesKey,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read config: {err}"),
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidSplitFraction(value) => {
                write!(f, "split fraction must be between 0 and 1, got {value}")
            }
            Self::BlankPropertyKey(role) => write!(f, "property key for `{role}` is blank"),
            Self::DuplicatePropertyKey(key) => {
                write!(f, "property key `{key}` is used for more than one role")
            }
            Self::BlankNotesKey => write!(f, "node notes key is blank"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl NoterConfig {
    /// Parses and validates a JSON config; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_split_fraction(self.default_split_fraction) {
            return Err(ConfigError::InvalidSplitFraction(
                self.default_split_fraction,
            ));
        }
        if self.node_notes_key.trim().is_empty() {
            return Err(ConfigError::BlankNotesKey);
        }

        let roles = self.property_keys.roles();
        for (index, (role, key)) in roles.iter().enumerate() {
            if key.trim().is_empty() || key.contains(char::is_whitespace) {
                return Err(ConfigError::BlankPropertyKey(role));
            }
            if roles[..index]
                .iter()
                .any(|(_, earlier)| earlier.eq_ignore_ascii_case(key))
            {
                return Err(ConfigError::DuplicatePropertyKey(key.to_string()));
            }
        }
        Ok(())
    }
}

pub(crate) fn is_valid_split_fraction(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}
