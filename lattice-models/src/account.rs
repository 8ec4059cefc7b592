// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::ModelsError;
use blake2::digest::consts::U5;
use blake2::{Blake2b, Digest};
use lattice_hash::Hash;
use lattice_serialization::{Deserializer, SerializeError, Serializer};
use lattice_signature::{PublicKey, PublicKeyDeserializer, Signature, PUBLIC_KEY_SIZE_BYTES};
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

/// Prefix of the text form of an account
pub const ACCOUNT_PREFIX: &str = "ban_";
const ACCOUNT_PREFIX_LEGACY: &str = "ban-";
const ACCOUNT_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";
/// 52 characters of key and 8 of checksum
const ACCOUNT_ENCODED_CHARS: usize = 60;
const CHECKSUM_SIZE_BYTES: usize = 5;
/// key bytes followed by the checksum bytes, 296 bits
const PAYLOAD_SIZE_BYTES: usize = PUBLIC_KEY_SIZE_BYTES + CHECKSUM_SIZE_BYTES;
/// the payload is left-padded with zero bits up to 60 * 5 = 300 bits
const PADDING_BITS: usize = ACCOUNT_ENCODED_CHARS * 5 - PAYLOAD_SIZE_BYTES * 8;

/// An account is identified by the Ed25519 public key owning its chain
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Account(PublicKey);

impl Account {
    /// The all-zero account, funds sent there are unspendable
    pub const BURN: Account = Account(PublicKey::from_bytes(&[0u8; PUBLIC_KEY_SIZE_BYTES]));

    /// Account of a public key
    pub const fn from_public_key(public_key: PublicKey) -> Self {
        Account(public_key)
    }

    /// Account of 32 raw key bytes
    pub const fn from_bytes(data: &[u8; PUBLIC_KEY_SIZE_BYTES]) -> Self {
        Account(PublicKey::from_bytes(data))
    }

    /// Key of the account
    pub fn public_key(&self) -> PublicKey {
        self.0
    }

    /// Raw key bytes
    pub fn to_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// Reinterprets the key bytes as a hash.
    ///
    /// Open blocks use it as their root, and the genesis open block has the
    /// genesis account standing in for the hash of its missing source.
    pub fn to_hash(&self) -> Hash {
        Hash::from_bytes(self.0.to_bytes())
    }

    /// Checks that `signature` over `hash` was produced by the owner of the account
    pub fn verify_signature(&self, hash: &Hash, signature: &Signature) -> Result<(), ModelsError> {
        Ok(self.0.verify_signature(hash, signature)?)
    }

    fn checksum(&self) -> [u8; CHECKSUM_SIZE_BYTES] {
        let mut hasher = Blake2b::<U5>::new();
        hasher.update(self.0.to_bytes());
        let mut checksum = [0u8; CHECKSUM_SIZE_BYTES];
        checksum.copy_from_slice(&hasher.finalize());
        // the checksum is appended as a little-endian number
        checksum.reverse();
        checksum
    }
}

fn payload_bit(payload: &[u8; PAYLOAD_SIZE_BYTES], index: usize) -> u8 {
    (payload[index / 8] >> (7 - index % 8)) & 1
}

impl std::fmt::Display for Account {
    /// ```
    /// # use lattice_models::account::Account;
    /// assert_eq!(
    ///     Account::BURN.to_string(),
    ///     "ban_1111111111111111111111111111111111111111111111111111hifc8npp"
    /// );
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut payload = [0u8; PAYLOAD_SIZE_BYTES];
        payload[..PUBLIC_KEY_SIZE_BYTES].copy_from_slice(self.0.to_bytes());
        payload[PUBLIC_KEY_SIZE_BYTES..].copy_from_slice(&self.checksum());

        let mut encoded = String::with_capacity(ACCOUNT_PREFIX.len() + ACCOUNT_ENCODED_CHARS);
        encoded.push_str(ACCOUNT_PREFIX);
        for char_index in 0..ACCOUNT_ENCODED_CHARS {
            let mut value = 0usize;
            for bit in char_index * 5..char_index * 5 + 5 {
                value <<= 1;
                if bit >= PADDING_BITS {
                    value |= payload_bit(&payload, bit - PADDING_BITS) as usize;
                }
            }
            encoded.push(ACCOUNT_ALPHABET[value] as char);
        }
        write!(f, "{}", encoded)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Account {
    type Err = ModelsError;

    /// Decodes `ban_` (or the older `ban-`) followed by 60 base-32 characters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(ACCOUNT_PREFIX)
            .or_else(|| s.strip_prefix(ACCOUNT_PREFIX_LEGACY))
            .ok_or_else(|| ModelsError::AccountParseError(format!("{}: bad prefix", s)))?;
        if body.len() != ACCOUNT_ENCODED_CHARS {
            return Err(ModelsError::AccountParseError(format!(
                "{}: expected {} characters after the prefix",
                s, ACCOUNT_ENCODED_CHARS
            )));
        }

        let mut payload = [0u8; PAYLOAD_SIZE_BYTES];
        for (char_index, character) in body.bytes().enumerate() {
            let value = ACCOUNT_ALPHABET
                .iter()
                .position(|c| *c == character)
                .ok_or_else(|| {
                    ModelsError::AccountParseError(format!(
                        "{}: invalid character {:?}",
                        s, character as char
                    ))
                })?;
            for offset in 0..5 {
                let bit = char_index * 5 + offset;
                let set = (value >> (4 - offset)) & 1 == 1;
                if bit < PADDING_BITS {
                    if set {
                        return Err(ModelsError::AccountParseError(format!(
                            "{}: value out of range",
                            s
                        )));
                    }
                } else if set {
                    let index = bit - PADDING_BITS;
                    payload[index / 8] |= 1 << (7 - index % 8);
                }
            }
        }

        let mut key = [0u8; PUBLIC_KEY_SIZE_BYTES];
        key.copy_from_slice(&payload[..PUBLIC_KEY_SIZE_BYTES]);
        let account = Account::from_bytes(&key);
        if account.checksum()[..] != payload[PUBLIC_KEY_SIZE_BYTES..] {
            return Err(ModelsError::AccountParseError(format!(
                "{}: checksum mismatch",
                s
            )));
        }
        Ok(account)
    }
}

/// Serializer for `Account`
#[derive(Default, Clone)]
pub struct AccountSerializer;

impl AccountSerializer {
    /// Creates a new `AccountSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<Account> for AccountSerializer {
    fn serialize(&self, value: &Account, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `Account`
#[derive(Default, Clone)]
pub struct AccountDeserializer {
    public_key_deserializer: PublicKeyDeserializer,
}

impl AccountDeserializer {
    /// Creates a new `AccountDeserializer`
    pub const fn new() -> Self {
        Self {
            public_key_deserializer: PublicKeyDeserializer::new(),
        }
    }
}

impl Deserializer<Account> for AccountDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Account, E> {
        context("Failed Account deserialization", |input: &'a [u8]| {
            self.public_key_deserializer.deserialize(input)
        })(buffer)
        .map(|(rest, public_key)| (rest, Account(public_key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TEST_KEY: &str = "D8887825DA4FC783B35B4C0A28984447813CE7628D8214174453A717C393B3F5";
    const TEST_ACCOUNT: &str = "ban_3p6ah1kxnmy9igsopm1c74e6ajw39mmp75e44idnanx94z3s9ezogicooigw";

    fn test_account() -> Account {
        Account::from_public_key(PublicKey::from_str(TEST_KEY).unwrap())
    }

    #[test]
    fn test_encode_known_address() {
        assert_eq!(test_account().to_string(), TEST_ACCOUNT);
    }

    #[test]
    fn test_decode_known_address() {
        assert_eq!(Account::from_str(TEST_ACCOUNT).unwrap(), test_account());
        let legacy = TEST_ACCOUNT.replacen('_', "-", 1);
        assert_eq!(Account::from_str(&legacy).unwrap(), test_account());
        assert_eq!(
            Account::from_str(&Account::BURN.to_string()).unwrap(),
            Account::BURN
        );
    }

    #[test]
    fn test_reject_bad_addresses() {
        // wrong prefix
        assert_matches!(
            Account::from_str(&TEST_ACCOUNT.replacen("ban_", "xrb_", 1)),
            Err(ModelsError::AccountParseError(_))
        );
        // truncated
        assert!(Account::from_str(&TEST_ACCOUNT[..63]).is_err());
        // '0' and 'l' are not in the alphabet
        let mut bad_char = TEST_ACCOUNT.to_string();
        bad_char.replace_range(10..11, "0");
        assert!(Account::from_str(&bad_char).is_err());
        // the first character only carries one payload bit
        let mut overflow = TEST_ACCOUNT.to_string();
        overflow.replace_range(4..5, "9");
        assert!(Account::from_str(&overflow).is_err());
        // last checksum character altered
        let mut bad_checksum = TEST_ACCOUNT.to_string();
        bad_checksum.replace_range(63..64, "x");
        assert_matches!(
            Account::from_str(&bad_checksum),
            Err(ModelsError::AccountParseError(msg)) if msg.contains("checksum")
        );
    }

    #[test]
    fn test_to_hash_keeps_bytes() {
        let account = test_account();
        assert_eq!(account.to_hash().to_bytes(), account.to_bytes());
    }

    #[test]
    fn test_serde_uses_address() {
        let serialized = serde_json::to_string(&test_account()).unwrap();
        assert_eq!(serialized, format!("\"{}\"", TEST_ACCOUNT));
        let deserialized: Account = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, test_account());
    }
}
