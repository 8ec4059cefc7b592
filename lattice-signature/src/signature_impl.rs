// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::SignatureError;
use blake2::{Blake2b512, Digest};
use ed25519_dalek::hazmat::{raw_sign, raw_verify, ExpandedSecretKey};
use ed25519_dalek::VerifyingKey;
use lattice_hash::Hash;
use lattice_serialization::{array_from_buffer, Deserializer};
use nom::{
    error::{context, ContextError, ParseError},
    IResult,
};
use rand::RngCore;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

/// Size of a public key
pub const PUBLIC_KEY_SIZE_BYTES: usize = 32;
/// Size of a keypair
pub const KEYPAIR_SIZE_BYTES: usize = 32;
/// Size of a signature
pub const SIGNATURE_SIZE_BYTES: usize = 64;

/// `KeyPair` is used for signature
///
/// Only the 32-byte secret is kept, the expanded key is derived on demand.
#[derive(Clone, Eq, PartialEq)]
pub struct KeyPair {
    secret: [u8; KEYPAIR_SIZE_BYTES],
    public: PublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "KeyPair({})", self.public)
    }
}

impl std::fmt::Display for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode_upper(self.secret))
    }
}

impl FromStr for KeyPair {
    type Err = SignatureError;

    /// Parses the 64 hexadecimal characters of a private key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut secret = [0u8; KEYPAIR_SIZE_BYTES];
        hex::decode_to_slice(s, &mut secret).map_err(|err| {
            SignatureError::ParsingError(format!("private key hex parsing error: {}", err))
        })?;
        Ok(KeyPair::from_bytes(&secret))
    }
}

fn expand(secret: &[u8; KEYPAIR_SIZE_BYTES]) -> ExpandedSecretKey {
    let mut hasher = Blake2b512::new();
    hasher.update(secret);
    let mut expanded = [0u8; 64];
    expanded.copy_from_slice(&hasher.finalize());
    ExpandedSecretKey::from_bytes(&expanded)
}

impl KeyPair {
    /// Generate a new `KeyPair` from the OS random source
    ///
    /// # Example
    ///  ```
    /// # use lattice_signature::KeyPair;
    /// # use lattice_hash::Hash;
    /// let keypair = KeyPair::generate();
    /// let data = Hash::compute_from("Hello World!".as_bytes());
    /// let signature = keypair.sign(&data);
    /// assert!(keypair.get_public_key().verify_signature(&data, &signature).is_ok());
    /// ```
    pub fn generate() -> KeyPair {
        let mut secret = [0u8; KEYPAIR_SIZE_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        KeyPair::from_bytes(&secret)
    }

    /// Builds the key pair of a 32-byte private key. Every value is a valid private key.
    pub fn from_bytes(secret: &[u8; KEYPAIR_SIZE_BYTES]) -> KeyPair {
        let public = VerifyingKey::from(&expand(secret));
        KeyPair {
            secret: *secret,
            public: PublicKey(public.to_bytes()),
        }
    }

    /// Return the bytes representing the private key
    pub fn to_bytes(&self) -> &[u8; KEYPAIR_SIZE_BYTES] {
        &self.secret
    }

    /// Returns the Signature produced by signing the bytes of `hash`
    pub fn sign(&self, hash: &Hash) -> Signature {
        let expanded = expand(&self.secret);
        let verifying_key = VerifyingKey::from(&expanded);
        let signature = raw_sign::<Blake2b512>(&expanded, hash.to_bytes(), &verifying_key);
        Signature(signature.to_bytes())
    }

    /// Get the public key of the keypair
    pub fn get_public_key(&self) -> PublicKey {
        self.public
    }
}

/// Public key, kept as raw bytes, only decoded as a curve point when verifying
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE_BYTES]);

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for PublicKey {
    type Err = SignatureError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; PUBLIC_KEY_SIZE_BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|err| {
            SignatureError::ParsingError(format!("public key hex parsing error: {}", err))
        })?;
        Ok(PublicKey(bytes))
    }
}

impl PublicKey {
    /// Wraps 32 raw bytes
    pub const fn from_bytes(data: &[u8; PUBLIC_KEY_SIZE_BYTES]) -> PublicKey {
        PublicKey(*data)
    }

    /// Serialize a `PublicKey` as bytes.
    pub fn to_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE_BYTES] {
        &self.0
    }

    /// Checks if the `Signature` associated with data bytes
    /// was produced with the `KeyPair` associated to given `PublicKey`
    pub fn verify_signature(&self, hash: &Hash, signature: &Signature) -> Result<(), SignatureError> {
        let verifying_key = VerifyingKey::from_bytes(&self.0)?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        raw_verify::<Blake2b512>(&verifying_key, hash.to_bytes(), &signature)?;
        Ok(())
    }
}

/// Deserializer for `PublicKey`
#[derive(Default, Clone)]
pub struct PublicKeyDeserializer;

impl PublicKeyDeserializer {
    /// Creates a `PublicKeyDeserializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<PublicKey> for PublicKeyDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], PublicKey, E> {
        context("Failed public key deserialization", |input: &'a [u8]| {
            let (rest, bytes) = array_from_buffer::<PUBLIC_KEY_SIZE_BYTES, E>(input)?;
            Ok((rest, PublicKey(bytes)))
        })(buffer)
    }
}

/// Ed25519 signature
#[derive(Clone, Copy, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Signature([u8; SIGNATURE_SIZE_BYTES]);

impl Default for Signature {
    fn default() -> Self {
        Signature([0u8; SIGNATURE_SIZE_BYTES])
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Signature {
    type Err = SignatureError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; SIGNATURE_SIZE_BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|err| {
            SignatureError::ParsingError(format!("signature hex parsing error: {}", err))
        })?;
        Ok(Signature(bytes))
    }
}

impl Signature {
    /// Wraps 64 raw bytes
    pub const fn from_bytes(data: &[u8; SIGNATURE_SIZE_BYTES]) -> Signature {
        Signature(*data)
    }

    /// Serialize a `Signature` as bytes.
    pub fn to_bytes(&self) -> &[u8; SIGNATURE_SIZE_BYTES] {
        &self.0
    }
}

/// Deserializer for `Signature`
#[derive(Default, Clone)]
pub struct SignatureDeserializer;

impl SignatureDeserializer {
    /// Creates a `SignatureDeserializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<Signature> for SignatureDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Signature, E> {
        context("Failed signature deserialization", |input: &'a [u8]| {
            let (rest, bytes) = array_from_buffer::<SIGNATURE_SIZE_BYTES, E>(input)?;
            Ok((rest, Signature(bytes)))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_serialization::DeserializeError;

    // test network genesis key pair
    const TEST_PRIVATE_KEY: &str =
        "5F6C2316A2D3208C752DDF8D154C6F0401E948129BC1B7AB3F146417F064E18C";
    const TEST_PUBLIC_KEY: &str =
        "D8887825DA4FC783B35B4C0A28984447813CE7628D8214174453A717C393B3F5";

    #[test]
    fn test_public_key_derivation() {
        let keypair = KeyPair::from_str(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(keypair.get_public_key().to_string(), TEST_PUBLIC_KEY);
        assert_eq!(keypair.to_string(), TEST_PRIVATE_KEY);
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate();
        let hash = Hash::compute_from(b"lattice");
        let signature = keypair.sign(&hash);
        let public_key = keypair.get_public_key();
        assert!(public_key.verify_signature(&hash, &signature).is_ok());

        let other = Hash::compute_from(b"tampered");
        assert!(public_key.verify_signature(&other, &signature).is_err());
        let stranger = KeyPair::generate().get_public_key();
        assert!(stranger.verify_signature(&hash, &signature).is_err());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = KeyPair::from_str(TEST_PRIVATE_KEY).unwrap();
        let hash = Hash::compute_from(b"vote");
        assert_eq!(keypair.sign(&hash), keypair.sign(&hash));
    }

    #[test]
    fn test_serde_json() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(&Hash::compute_from(b"data"));
        let serialized = serde_json::to_string(&signature).unwrap();
        let deserialized: Signature = serde_json::from_str(&serialized).unwrap();
        assert_eq!(signature, deserialized);

        let public_key = keypair.get_public_key();
        let serialized = serde_json::to_string(&public_key).unwrap();
        let deserialized: PublicKey = serde_json::from_str(&serialized).unwrap();
        assert_eq!(public_key, deserialized);
    }

    #[test]
    fn test_deserializers() {
        let signature = KeyPair::generate().sign(&Hash::zero());
        let (rest, parsed) = SignatureDeserializer::new()
            .deserialize::<DeserializeError>(signature.to_bytes())
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, signature);
        assert!(PublicKeyDeserializer::new()
            .deserialize::<DeserializeError>(&[0u8; 31])
            .is_err());
    }

    #[test]
    fn test_bad_private_key() {
        assert!(KeyPair::from_str("00").is_err());
    }
}
