//! Parser behaviour switches.

use std::fs;
use std::path::Path;

use bbh_core::errors::{ErrorInfo, MetaError};
use serde::{Deserialize, Serialize};

/// YAML-configurable parsing behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// What to do when a key appears twice.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Reject records whose masses are not strictly positive.
    #[serde(default = "default_true")]
    pub enforce_invariants: bool,
    /// Accept `relaxed-*` spellings of reference-time keys.
    #[serde(default = "default_true")]
    pub accept_aliases: bool,
    /// Run physical-convention checks and log their findings after parsing.
    #[serde(default)]
    pub validate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::default(),
            enforce_invariants: true,
            accept_aliases: true,
            validate: false,
        }
    }
}

impl ParseOptions {
    /// Loads options from a YAML file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, MetaError> {
        let text = fs::read_to_string(path).map_err(|err| {
            MetaError::Io(
                ErrorInfo::new("bbh_meta.config_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml(&text).map_err(|err| match err {
            MetaError::Serde(info) => {
                MetaError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Parses options from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, MetaError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|err| MetaError::Serde(ErrorInfo::new("bbh_meta.config_parse", err.to_string())))
    }
}

/// Handling of repeated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail with [`MetaError::Duplicate`].
    #[default]
    Reject,
    /// Keep the first occurrence.
    First,
    /// Keep the last occurrence.
    Last,
}
