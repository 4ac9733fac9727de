//! Line scanner for the `key = value` metadata format.

use std::fmt;

use bbh_core::errors::{ErrorInfo, MetaError};
use serde::Serialize;

/// One `key = value` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// 1-based line number in the scanned text.
    pub line: usize,
    /// Key as written, trimmed.
    pub key: String,
    /// Raw value text, trimmed.
    pub value: String,
}

/// A scanned line, kept so the document can be reproduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `#` comment, stored verbatim.
    Comment(String),
    /// Empty or whitespace-only line.
    Blank,
    /// Data line.
    Entry(Entry),
}

/// Lossless line-level view of a metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// All lines in source order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Data lines in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    /// Number of data lines.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Whether the document has no data lines.
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub(crate) fn push(&mut self, line: Line) {
        self.lines.push(line);
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Comment(text) => writeln!(f, "{text}")?,
                Line::Blank => writeln!(f)?,
                Line::Entry(entry) if entry.value.is_empty() => writeln!(f, "{} =", entry.key)?,
                Line::Entry(entry) => writeln!(f, "{} = {}", entry.key, entry.value)?,
            }
        }
        Ok(())
    }
}

/// Whether `key` is a valid identifier: an ASCII alphanumeric followed by
/// alphanumerics, `-` or `_`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Splits `text` into comments, blanks and entries.
pub fn scan(text: &str) -> Result<Document, MetaError> {
    let mut document = Document::default();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            document.push(Line::Blank);
            continue;
        }
        if trimmed.starts_with('#') {
            document.push(Line::Comment(line.trim_end().to_string()));
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(MetaError::Syntax(
                ErrorInfo::new("bbh_meta.missing_equals", "expected `key = value`")
                    .with_context("line", line_no.to_string())
                    .with_context("text", trimmed),
            ));
        };
        let key = key.trim();
        if !is_valid_key(key) {
            return Err(MetaError::Syntax(
                ErrorInfo::new("bbh_meta.invalid_key", format!("`{key}` is not a valid key"))
                    .at(line_no, key)
                    .with_hint(
                        "keys start with a letter or digit, followed by letters, digits, `-` or `_`",
                    ),
            ));
        }
        document.push(Line::Entry(Entry {
            line: line_no,
            key: key.to_string(),
            value: value.trim().to_string(),
        }));
    }
    Ok(document)
}
