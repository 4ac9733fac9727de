//! Content hashes over canonical JSON.

use bbh_core::errors::MetaError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::record::SimulationRecord;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, MetaError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(hex::encode(Sha256::digest(bytes)))
}

/// Content hash of a record's typed values, independent of layout and comments.
pub fn record_hash(record: &SimulationRecord) -> Result<String, MetaError> {
    stable_hash_string(record)
}
