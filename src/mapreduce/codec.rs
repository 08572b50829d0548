//! Wire codec for records crossing the shuffle.
//!
//! Records are encoded with bincode in serde field declaration order. The
//! layout is private to a run; nothing is persisted across versions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode record: {0}")]
    Encode(#[source] bincode::Error),

    #[error("Failed to decode record: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a record to shuffle bytes.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(CodecError::Encode)
}

/// Decode a record from shuffle bytes.
///
/// # Errors
///
/// Returns `CodecError::Decode` if the bytes are not a valid encoding of `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(CodecError::Decode)
}
