// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Binary serialization primitives shared by every lattice crate.
//!
//! Serialization appends to a caller-provided buffer, deserialization is a
//! `nom` parser returning the unread rest of the input.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

use displaydoc::Display;
use nom::error::{ContextError, ErrorKind, ParseError};
use nom::IResult;
use std::fmt::Display as StdDisplay;
use thiserror::Error;

/// Serialization failure
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum SerializeError {
    /// Number {0} is too big to be serialized
    NumberTooBig(String),
    /// General error {0}
    GeneralError(String),
}

/// Error type accumulated by `nom` parsers while deserializing.
///
/// Keeps every failing position along with the context labels pushed by
/// `nom::error::context`, outermost last.
#[derive(Debug)]
pub struct DeserializeError<'a> {
    errors: Vec<(&'a [u8], ErrorKind)>,
    contexts: Vec<(&'a [u8], &'static str)>,
}

impl<'a> ParseError<&'a [u8]> for DeserializeError<'a> {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        Self {
            errors: vec![(input, kind)],
            contexts: Vec::new(),
        }
    }

    fn append(input: &'a [u8], kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, kind));
        other
    }
}

impl<'a> ContextError<&'a [u8]> for DeserializeError<'a> {
    fn add_context(input: &'a [u8], ctx: &'static str, mut other: Self) -> Self {
        other.contexts.push((input, ctx));
        other
    }
}

impl<'a> StdDisplay for DeserializeError<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (input, ctx) in self.contexts.iter().rev() {
            if !first {
                write!(f, " / ")?;
            }
            write!(f, "{} ({} bytes left)", ctx, input.len())?;
            first = false;
        }
        if let Some((input, kind)) = self.errors.first() {
            if !first {
                write!(f, ": ")?;
            }
            write!(f, "{} ({} bytes left)", kind.description(), input.len())?;
        }
        Ok(())
    }
}

/// Serializer of a `T` into bytes
pub trait Serializer<T> {
    /// Appends the binary form of `value` to `buffer`
    fn serialize(&self, value: &T, buffer: &mut Vec<u8>) -> Result<(), SerializeError>;
}

/// Deserializer of a `T` from bytes
pub trait Deserializer<T> {
    /// Parses a `T` from the beginning of `buffer`, returning the rest of it
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], T, E>;
}

/// Reads exactly `N` bytes into an array
pub fn array_from_buffer<'a, const N: usize, E: ParseError<&'a [u8]>>(
    buffer: &'a [u8],
) -> IResult<&'a [u8], [u8; N], E> {
    if buffer.len() < N {
        return Err(nom::Err::Error(E::from_error_kind(
            buffer,
            ErrorKind::LengthValue,
        )));
    }
    let mut array = [0u8; N];
    array.copy_from_slice(&buffer[..N]);
    Ok((&buffer[N..], array))
}

/// Fixed 8-byte little-endian serializer for `u64`
#[derive(Clone, Default)]
pub struct U64LeSerializer;

impl U64LeSerializer {
    /// Creates a new `U64LeSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<u64> for U64LeSerializer {
    fn serialize(&self, value: &u64, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_le_bytes());
        Ok(())
    }
}

/// Fixed 8-byte little-endian deserializer for `u64`
#[derive(Clone, Default)]
pub struct U64LeDeserializer;

impl U64LeDeserializer {
    /// Creates a new `U64LeDeserializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<u64> for U64LeDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], u64, E> {
        nom::error::context("Failed u64 deserialization", |input: &'a [u8]| {
            let (rest, bytes) = array_from_buffer::<8, E>(input)?;
            Ok((rest, u64::from_le_bytes(bytes)))
        })(buffer)
    }
}

/// Fixed 16-byte big-endian serializer for `u128`
#[derive(Clone, Default)]
pub struct U128BeSerializer;

impl U128BeSerializer {
    /// Creates a new `U128BeSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<u128> for U128BeSerializer {
    fn serialize(&self, value: &u128, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_be_bytes());
        Ok(())
    }
}

/// Fixed 16-byte big-endian deserializer for `u128`
#[derive(Clone, Default)]
pub struct U128BeDeserializer;

impl U128BeDeserializer {
    /// Creates a new `U128BeDeserializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<u128> for U128BeDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], u128, E> {
        nom::error::context("Failed u128 deserialization", |input: &'a [u8]| {
            let (rest, bytes) = array_from_buffer::<16, E>(input)?;
            Ok((rest, u128::from_be_bytes(bytes)))
        })(buffer)
    }
}

/// Single byte serializer
#[derive(Clone, Default)]
pub struct U8Serializer;

impl U8Serializer {
    /// Creates a new `U8Serializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<u8> for U8Serializer {
    fn serialize(&self, value: &u8, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.push(*value);
        Ok(())
    }
}

/// Single byte deserializer
#[derive(Clone, Default)]
pub struct U8Deserializer;

impl U8Deserializer {
    /// Creates a new `U8Deserializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<u8> for U8Deserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], u8, E> {
        nom::error::context("Failed u8 deserialization", |input: &'a [u8]| {
            let (rest, [byte]) = array_from_buffer::<1, E>(input)?;
            Ok((rest, byte))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_is_little_endian() {
        let mut buffer = Vec::new();
        U64LeSerializer::new().serialize(&1, &mut buffer).unwrap();
        assert_eq!(buffer, vec![1, 0, 0, 0, 0, 0, 0, 0]);
        let (rest, value) = U64LeDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(value, 1);
    }

    #[test]
    fn test_u128_is_big_endian() {
        let mut buffer = Vec::new();
        U128BeSerializer::new().serialize(&1, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer[15], 1);
        assert!(buffer[..15].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_truncated_input_reports_context() {
        let err = U64LeDeserializer::new()
            .deserialize::<DeserializeError>(&[1, 2, 3])
            .unwrap_err();
        match err {
            nom::Err::Error(e) => {
                assert!(e.to_string().starts_with("Failed u64 deserialization"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
