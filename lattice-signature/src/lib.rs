// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Signature management
//!
//! Ed25519 where every internal digest (key expansion, nonce, challenge) is
//! Blake2b-512 instead of SHA-512.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]
mod error;
mod signature_impl;

pub use error::SignatureError;
pub use signature_impl::{
    KeyPair, PublicKey, PublicKeyDeserializer, Signature, SignatureDeserializer,
    KEYPAIR_SIZE_BYTES, PUBLIC_KEY_SIZE_BYTES, SIGNATURE_SIZE_BYTES,
};
