// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::account::{Account, AccountDeserializer};
use crate::amount::{Amount, AmountDeserializer};
use crate::block::BlockHash;
use crate::record::from_fixed_bytes;
use crate::ModelsError;
use lattice_hash::HashDeserializer;
use lattice_serialization::{Deserializer, SerializeError, Serializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

/// Width of an encoded `PendingKey`
pub const PENDING_KEY_SIZE_BYTES: usize = 32 + 32;
/// Width of an encoded `PendingInfo`
pub const PENDING_INFO_SIZE_BYTES: usize = 32 + 16;

/// Key of a receivable: the destination account, then the send block.
/// The encoding keeps every receivable of an account contiguous in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    /// destination of the send
    pub account: Account,
    /// the send block
    pub hash: BlockHash,
}

/// Value of a receivable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    /// sender account
    pub source: Account,
    /// amount sent
    pub amount: Amount,
}

impl PendingKey {
    /// Fixed-width binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PENDING_KEY_SIZE_BYTES);
        bytes.extend(self.account.to_bytes());
        bytes.extend(self.hash.to_bytes());
        bytes
    }

    /// Decodes exactly `PENDING_KEY_SIZE_BYTES` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<PendingKey, ModelsError> {
        from_fixed_bytes(&PendingKeyDeserializer::new(), bytes, PENDING_KEY_SIZE_BYTES)
    }
}

impl PendingInfo {
    /// Fixed-width binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PENDING_INFO_SIZE_BYTES);
        bytes.extend(self.source.to_bytes());
        bytes.extend(self.amount.to_raw().to_be_bytes());
        bytes
    }

    /// Decodes exactly `PENDING_INFO_SIZE_BYTES` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<PendingInfo, ModelsError> {
        from_fixed_bytes(&PendingInfoDeserializer::new(), bytes, PENDING_INFO_SIZE_BYTES)
    }
}

/// Serializer for `PendingKey`
#[derive(Default, Clone)]
pub struct PendingKeySerializer;

impl PendingKeySerializer {
    /// Creates a new `PendingKeySerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<PendingKey> for PendingKeySerializer {
    fn serialize(&self, value: &PendingKey, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `PendingKey`
#[derive(Default, Clone)]
pub struct PendingKeyDeserializer {
    account_deserializer: AccountDeserializer,
    hash_deserializer: HashDeserializer,
}

impl PendingKeyDeserializer {
    /// Creates a new `PendingKeyDeserializer`
    pub const fn new() -> Self {
        Self {
            account_deserializer: AccountDeserializer::new(),
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<PendingKey> for PendingKeyDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], PendingKey, E> {
        context(
            "Failed PendingKey deserialization",
            tuple((
                |input| self.account_deserializer.deserialize(input),
                |input| self.hash_deserializer.deserialize(input),
            )),
        )
        .map(|(account, hash)| PendingKey { account, hash })
        .parse(buffer)
    }
}

/// Serializer for `PendingInfo`
#[derive(Default, Clone)]
pub struct PendingInfoSerializer;

impl PendingInfoSerializer {
    /// Creates a new `PendingInfoSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<PendingInfo> for PendingInfoSerializer {
    fn serialize(&self, value: &PendingInfo, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `PendingInfo`
#[derive(Default, Clone)]
pub struct PendingInfoDeserializer {
    account_deserializer: AccountDeserializer,
    amount_deserializer: AmountDeserializer,
}

impl PendingInfoDeserializer {
    /// Creates a new `PendingInfoDeserializer`
    pub const fn new() -> Self {
        Self {
            account_deserializer: AccountDeserializer::new(),
            amount_deserializer: AmountDeserializer::new(),
        }
    }
}

impl Deserializer<PendingInfo> for PendingInfoDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], PendingInfo, E> {
        context(
            "Failed PendingInfo deserialization",
            tuple((
                |input| self.account_deserializer.deserialize(input),
                |input| self.amount_deserializer.deserialize(input),
            )),
        )
        .map(|(source, amount)| PendingInfo { source, amount })
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lattice_hash::Hash;

    #[test]
    fn test_pending_key() {
        let key = PendingKey {
            account: Account::from_bytes(&[7u8; 32]),
            hash: Hash::compute_from(b"send"),
        };
        let bytes = key.to_bytes();
        assert_eq!(bytes.len(), PENDING_KEY_SIZE_BYTES);
        assert_eq!(&bytes[..32], &[7u8; 32]);
        assert_eq!(PendingKey::from_bytes(&bytes).unwrap(), key);
        assert_matches!(
            PendingKey::from_bytes(&bytes[1..]),
            Err(ModelsError::SizeMismatch {
                expected: 64,
                got: 63
            })
        );
    }

    #[test]
    fn test_pending_info() {
        let info = PendingInfo {
            source: Account::BURN,
            amount: Amount::from_raw(5),
        };
        let bytes = info.to_bytes();
        assert_eq!(bytes.len(), PENDING_INFO_SIZE_BYTES);
        assert_eq!(bytes[47], 5);
        assert_eq!(PendingInfo::from_bytes(&bytes).unwrap(), info);
        assert!(PendingInfo::from_bytes(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_keys_of_an_account_are_contiguous() {
        let low = PendingKey {
            account: Account::from_bytes(&[1u8; 32]),
            hash: Hash::from_bytes(&[0xff; 32]),
        };
        let high = PendingKey {
            account: Account::from_bytes(&[2u8; 32]),
            hash: Hash::zero(),
        };
        assert!(low.to_bytes() < high.to_bytes());
        assert!(low < high);
    }
}
