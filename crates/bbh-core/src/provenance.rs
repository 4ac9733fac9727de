//! Provenance and schema descriptors carried by every metadata record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the metadata layout, written as `metadata-version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(u32);

impl SchemaVersion {
    /// Layout version produced by current pipelines.
    pub const CURRENT: SchemaVersion = SchemaVersion(1);

    /// Creates a new schema version descriptor.
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the raw integer version.
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Whether readers built for [`SchemaVersion::CURRENT`] understand this version.
    pub fn is_supported(&self) -> bool {
        self.0 >= 1 && self.0 <= Self::CURRENT.0
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code revisions that produced a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CodeProvenance {
    /// Layout version of the metadata file.
    pub metadata_version: Option<SchemaVersion>,
    /// Evolution code revisions in the order they were used during the run.
    #[serde(default)]
    pub evolution_revisions: Vec<String>,
    /// Revision of the initial-data solver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_data_revision: Option<String>,
}

impl CodeProvenance {
    /// Revision the evolution finished on, if any were recorded.
    pub fn final_evolution_revision(&self) -> Option<&str> {
        self.evolution_revisions.last().map(String::as_str)
    }
}
