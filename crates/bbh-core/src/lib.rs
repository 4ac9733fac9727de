#![deny(missing_docs)]
#![doc = "Core error, provenance and numeric types shared by the simulation metadata crates."]

pub mod errors;
pub mod provenance;
mod types;

pub use errors::{ErrorInfo, MetaError};
pub use provenance::{CodeProvenance, SchemaVersion};
pub use types::{format_float, Bounded, ObjectKind, Vec3};
