// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::ModelsError;
use lattice_serialization::{DeserializeError, Deserializer};

/// Decodes a fixed-width record. Any length other than `expected` is refused
/// before a single field is read.
pub(crate) fn from_fixed_bytes<T, D: Deserializer<T>>(
    deserializer: &D,
    bytes: &[u8],
    expected: usize,
) -> Result<T, ModelsError> {
    if bytes.len() != expected {
        return Err(ModelsError::SizeMismatch {
            expected,
            got: bytes.len(),
        });
    }
    let (_, value) = deserializer
        .deserialize::<DeserializeError>(bytes)
        .map_err(|err| ModelsError::DeserializeError(err.to_string()))?;
    Ok(value)
}
