//! Coercion of raw value text into typed values.

use std::fmt;

use bbh_core::errors::{ErrorInfo, MetaError};
use bbh_core::{format_float, Bounded, ObjectKind, Vec3};
use serde::{Deserialize, Serialize};

/// Shape a key's value is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Bare string.
    Text,
    /// Comma separated bare tokens.
    TextList,
    /// Single float.
    Float,
    /// Exactly three comma separated floats.
    Vector,
    /// Float optionally prefixed with `<`.
    Bounded,
    /// Integer.
    Integer,
    /// `bh` or `ns`.
    Object,
}

impl ValueKind {
    /// Short name used in listings.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::TextList => "list",
            ValueKind::Float => "float",
            ValueKind::Vector => "vector",
            ValueKind::Bounded => "bounded",
            ValueKind::Integer => "integer",
            ValueKind::Object => "object",
        }
    }

    /// Whether an empty value means an empty collection rather than absence.
    pub fn is_list(&self) -> bool {
        matches!(self, ValueKind::TextList)
    }
}

/// A coerced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Trimmed text.
    Text(String),
    /// List items, trimmed, empty items dropped.
    TextList(Vec<String>),
    /// Float, including `nan` and `inf`.
    Float(f64),
    /// Three components.
    Vector(Vec3),
    /// Exact value or upper bound.
    Bounded(Bounded),
    /// Integer.
    Integer(i64),
    /// Compact object type.
    Object(ObjectKind),
}

impl Value {
    /// Coerces `raw` into `kind`, attributing failures to `line` and `key`.
    pub fn parse(kind: ValueKind, raw: &str, line: usize, key: &str) -> Result<Value, MetaError> {
        Ok(match kind {
            ValueKind::Text => Value::Text(raw.trim().to_string()),
            ValueKind::TextList => Value::TextList(parse_list(raw)),
            ValueKind::Float => Value::Float(parse_float(raw, line, key)?),
            ValueKind::Vector => Value::Vector(parse_vector(raw, line, key)?),
            ValueKind::Bounded => Value::Bounded(parse_bounded(raw, line, key)?),
            ValueKind::Integer => Value::Integer(parse_integer(raw, line, key)?),
            ValueKind::Object => Value::Object(parse_object(raw, line, key)?),
        })
    }

    /// Classifies a value whose key has no known kind.
    pub fn infer(raw: &str) -> Value {
        let raw = raw.trim();
        if let Ok(int) = raw.parse::<i64>() {
            return Value::Integer(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return Value::Float(float);
        }
        if let Some(bound) = raw.strip_prefix('<') {
            if let Ok(float) = bound.trim().parse::<f64>() {
                return Value::Bounded(Bounded::UpperBound(float));
            }
        }
        if raw.contains(',') {
            if let Ok(vector) = parse_vector(raw, 0, "") {
                return Value::Vector(vector);
            }
            return Value::TextList(parse_list(raw));
        }
        Value::Text(raw.to_string())
    }

    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::TextList(_) => ValueKind::TextList,
            Value::Float(_) => ValueKind::Float,
            Value::Vector(_) => ValueKind::Vector,
            Value::Bounded(_) => ValueKind::Bounded,
            Value::Integer(_) => ValueKind::Integer,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::TextList(items) => f.write_str(&items.join(", ")),
            Value::Float(value) => f.write_str(&format_float(*value)),
            Value::Vector(vector) => write!(f, "{vector}"),
            Value::Bounded(bounded) => write!(f, "{bounded}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Object(kind) => write!(f, "{kind}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec3> for Value {
    fn from(value: Vec3) -> Self {
        Value::Vector(value)
    }
}

impl From<Bounded> for Value {
    fn from(value: Bounded) -> Self {
        Value::Bounded(value)
    }
}

impl From<ObjectKind> for Value {
    fn from(value: ObjectKind) -> Self {
        Value::Object(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::TextList(value)
    }
}

fn value_error(code: &str, message: String, line: usize, key: &str) -> MetaError {
    MetaError::Value(ErrorInfo::new(code, message).at(line, key))
}

/// Parses a single float.
pub fn parse_float(raw: &str, line: usize, key: &str) -> Result<f64, MetaError> {
    let token = raw.trim();
    if token.starts_with('<') {
        return Err(value_error(
            "bbh_meta.unexpected_bound",
            format!("`{token}` is a bound but `{key}` takes an exact number"),
            line,
            key,
        ));
    }
    token.parse::<f64>().map_err(|_| {
        value_error(
            "bbh_meta.not_a_number",
            format!("`{token}` is not a number"),
            line,
            key,
        )
    })
}

/// Parses an integer, rejecting fractional and exponent forms.
pub fn parse_integer(raw: &str, line: usize, key: &str) -> Result<i64, MetaError> {
    let token = raw.trim();
    token.parse::<i64>().map_err(|_| {
        value_error(
            "bbh_meta.not_an_integer",
            format!("`{token}` is not an integer"),
            line,
            key,
        )
    })
}

/// Parses exactly three comma separated floats.
pub fn parse_vector(raw: &str, line: usize, key: &str) -> Result<Vec3, MetaError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(MetaError::Value(
            ErrorInfo::new(
                "bbh_meta.vector_arity",
                format!("expected 3 components, found {}", parts.len()),
            )
            .at(line, key)
            .with_context("value", raw.trim()),
        ));
    }
    let mut components = [0.0; 3];
    for (slot, part) in components.iter_mut().zip(parts) {
        *slot = parse_float(part, line, key)?;
    }
    Ok(Vec3(components))
}

/// Parses a float, treating a leading `<` as an upper bound.
pub fn parse_bounded(raw: &str, line: usize, key: &str) -> Result<Bounded, MetaError> {
    let token = raw.trim();
    match token.strip_prefix('<') {
        Some(rest) => Ok(Bounded::UpperBound(parse_float(rest, line, key)?)),
        None => Ok(Bounded::Exact(parse_float(token, line, key)?)),
    }
}

/// Splits on commas, trimming tokens and dropping empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a compact object kind.
pub fn parse_object(raw: &str, line: usize, key: &str) -> Result<ObjectKind, MetaError> {
    raw.trim()
        .parse::<ObjectKind>()
        .map_err(|message| value_error("bbh_meta.object_kind", message, line, key))
}
