// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// Result of the models operations
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// Errors of the models crate
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ModelsError {
    /// Serialization error: {0}
    SerializeError(#[from] lattice_serialization::SerializeError),
    /// Deserialization error: {0}
    DeserializeError(String),
    /// record size mismatch: expected {expected} bytes, got {got}
    SizeMismatch {
        /// fixed width of the record
        expected: usize,
        /// length of the given buffer
        got: usize,
    },
    /// lattice_hash error: {0}
    HashError(#[from] lattice_hash::HashError),
    /// lattice_signature error: {0}
    SignatureError(#[from] lattice_signature::SignatureError),
    /// account parse error: {0}
    AccountParseError(String),
    /// amount parse error: {0}
    AmountParseError(String),
    /// block json error: {0}
    BlockJsonError(String),
    /// invalid genesis: {0}
    GenesisError(String),
    /// unknown network: {0}
    NetworkParseError(String),
    /// configuration error: {0}
    ConfigError(String),
}
