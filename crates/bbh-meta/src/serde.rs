//! Canonical JSON encoding shared by hashing and the command line.

use bbh_core::errors::{ErrorInfo, MetaError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes to pretty JSON with object keys in sorted order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, MetaError> {
    let tree = serde_json::to_value(value)
        .map_err(|err| MetaError::Serde(ErrorInfo::new("bbh_meta.json_encode", err.to_string())))?;
    let mut bytes = serde_json::to_vec_pretty(&tree)
        .map_err(|err| MetaError::Serde(ErrorInfo::new("bbh_meta.json_encode", err.to_string())))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes JSON, including records written by [`to_canonical_json_bytes`].
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, MetaError> {
    serde_json::from_slice(bytes)
        .map_err(|err| MetaError::Serde(ErrorInfo::new("bbh_meta.json_decode", err.to_string())))
}
