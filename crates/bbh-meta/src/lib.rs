//! Reader and writer for binary black hole simulation metadata files.
//!
//! A metadata file is a list of `key = value` lines with `#` comments. The
//! [`lexer`] splits it into lines, [`value`] coerces raw text by key kind and
//! [`record`] assembles the typed, immutable [`SimulationRecord`].

#![deny(missing_docs)]

pub mod derived;
pub mod hash;
pub mod keys;
pub mod lexer;
pub mod options;
pub mod record;
pub mod serde;
pub mod validate;
pub mod value;
pub mod write;

pub use derived::{component_states, DerivedQuantities, RingdownParameters};
pub use hash::{record_hash, stable_hash_string};
pub use keys::{KeySpec, Section, KEYS};
pub use lexer::{scan, Document, Entry, Line};
pub use options::{DuplicatePolicy, ParseOptions};
pub use record::{
    parse_file, parse_str, Bibliography, BodyState, Evolution, Identity, InitialData,
    InitialQuantities, RecordBuilder, ReferenceQuantities, Remnant, SimulationRecord,
};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
pub use validate::{validate, Finding, Severity, ValidationReport};
pub use value::{Value, ValueKind};
pub use write::to_text;
