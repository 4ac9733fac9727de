//! Structured error types shared across the metadata crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MetaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (line numbers, keys, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the 1-based source line and the key the error refers to.
    pub fn at(self, line: usize, key: &str) -> Self {
        self.with_context("line", line.to_string())
            .with_context("key", key)
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Returns the source line recorded in the context, if any.
    pub fn line(&self) -> Option<usize> {
        self.context.get("line").and_then(|line| line.parse().ok())
    }

    /// Returns the key recorded in the context, if any.
    pub fn key(&self) -> Option<&str> {
        self.context.get("key").map(String::as_str)
    }
}

/// Canonical error type for metadata parsing and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MetaError {
    /// A data line that is not of the form `key = value`.
    #[error("syntax error: {0}")]
    Syntax(ErrorInfo),
    /// A value that cannot be coerced into the kind its key requires.
    #[error("value error: {0}")]
    Value(ErrorInfo),
    /// A field requested by the caller is missing from the record.
    #[error("field absent: {0}")]
    Absent(ErrorInfo),
    /// A key appears more than once.
    #[error("duplicate key: {0}")]
    Duplicate(ErrorInfo),
    /// A record invariant does not hold.
    #[error("invariant violated: {0}")]
    Invariant(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and configuration errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl MetaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MetaError::Syntax(info)
            | MetaError::Value(info)
            | MetaError::Absent(info)
            | MetaError::Duplicate(info)
            | MetaError::Invariant(info)
            | MetaError::Io(info)
            | MetaError::Serde(info) => info,
        }
    }

    /// Convenience constructor for a missing field.
    pub fn absent(key: &str) -> Self {
        MetaError::Absent(
            ErrorInfo::new("bbh_meta.absent", format!("`{key}` is not present"))
                .with_context("key", key),
        )
    }
}
