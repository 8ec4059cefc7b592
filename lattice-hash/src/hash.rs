// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::HashError;
use crate::settings::HASH_SIZE_BYTES;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use lattice_serialization::{Deserializer, SerializeError, Serializer};
use nom::{
    error::{context, ContextError, ParseError},
    IResult,
};
use std::str::FromStr;

type Blake2b256 = Blake2b<U32>;

/// Hash wrapper, the underlying hash type is `Blake2b` with a 32-byte output
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Default)]
pub struct Hash([u8; HASH_SIZE_BYTES]);

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Hash {
    /// The all-zero hash, used as "no block"
    pub const fn zero() -> Self {
        Hash([0u8; HASH_SIZE_BYTES])
    }

    /// true if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// Compute a hash from data.
    ///
    /// # Example
    ///  ```
    /// # use lattice_hash::Hash;
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// ```
    pub fn compute_from(data: &[u8]) -> Self {
        Self::compute_from_parts(&[data])
    }

    /// Compute a hash over the concatenation of several byte slices
    /// without allocating the concatenation.
    ///
    /// # Example
    ///  ```
    /// # use lattice_hash::Hash;
    /// let joined = Hash::compute_from(b"helloworld");
    /// let parts = Hash::compute_from_parts(&[&b"hello"[..], &b"world"[..]]);
    /// assert_eq!(joined, parts);
    /// ```
    pub fn compute_from_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut bytes = [0u8; HASH_SIZE_BYTES];
        bytes.copy_from_slice(&hasher.finalize());
        Hash(bytes)
    }

    /// Uppercase hexadecimal form
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parses a 64 character hexadecimal string, case insensitive
    ///
    /// # Example
    ///  ```
    /// # use lattice_hash::Hash;
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// let parsed = Hash::from_hex(&hash.to_hex().to_lowercase()).unwrap();
    /// assert_eq!(hash, parsed);
    /// ```
    pub fn from_hex(data: &str) -> Result<Hash, HashError> {
        let mut bytes = [0u8; HASH_SIZE_BYTES];
        hex::decode_to_slice(data, &mut bytes)
            .map_err(|err| HashError::ParsingError(format!("{}", err)))?;
        Ok(Hash(bytes))
    }

    /// Serialize a Hash as bytes.
    pub fn to_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.0
    }

    /// Convert into bytes.
    pub fn into_bytes(self) -> [u8; HASH_SIZE_BYTES] {
        self.0
    }

    /// Deserialize a Hash from bytes.
    pub const fn from_bytes(data: &[u8; HASH_SIZE_BYTES]) -> Hash {
        Hash(*data)
    }
}

impl FromStr for Hash {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl ::serde::Serialize for Hash {
    /// if the serializer is human readable the hexadecimal form is used,
    /// raw bytes otherwise
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_hex())
        } else {
            s.serialize_bytes(&self.0)
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Hash {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        if d.is_human_readable() {
            struct HexVisitor;

            impl<'de> ::serde::de::Visitor<'de> for HexVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a 64 character hexadecimal string")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Hash::from_hex(v).map_err(E::custom)
                }
            }
            d.deserialize_str(HexVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Ok(Hash::from_bytes(v.try_into().map_err(E::custom)?))
                }
            }

            d.deserialize_bytes(BytesVisitor)
        }
    }
}

/// Serializer for `Hash`
#[derive(Default, Clone)]
pub struct HashSerializer;

impl HashSerializer {
    /// Creates a serializer for `Hash`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<Hash> for HashSerializer {
    fn serialize(&self, value: &Hash, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `Hash`
#[derive(Default, Clone)]
pub struct HashDeserializer;

impl HashDeserializer {
    /// Creates a deserializer for `Hash`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<Hash> for HashDeserializer {
    /// ## Example
    /// ```rust
    /// use lattice_hash::{Hash, HashDeserializer};
    /// use lattice_serialization::{Deserializer, DeserializeError};
    ///
    /// let hash_deserializer = HashDeserializer::new();
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// let (rest, deserialized) = hash_deserializer.deserialize::<DeserializeError>(hash.to_bytes()).unwrap();
    /// assert_eq!(deserialized, hash);
    /// assert_eq!(rest.len(), 0);
    /// ```
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Hash, E> {
        context("Failed hash deserialization", |input: &'a [u8]| {
            let (rest, bytes) =
                lattice_serialization::array_from_buffer::<HASH_SIZE_BYTES, E>(input)?;
            Ok((rest, Hash(bytes)))
        })(buffer)
    }
}
