// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::amount::{Amount, AmountDeserializer};
use crate::block::BlockHash;
use crate::record::from_fixed_bytes;
use crate::ModelsError;
use lattice_hash::HashDeserializer;
use lattice_serialization::{Deserializer, SerializeError, Serializer, U64LeDeserializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

/// Width of an encoded `AccountInfo`
pub const ACCOUNT_INFO_SIZE_BYTES: usize = 32 + 32 + 32 + 16 + 8 + 8;

/// Metadata of an account chain, stored under the account key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    /// latest block of the chain
    pub head: BlockHash,
    /// block that last set the representative
    pub rep_block: BlockHash,
    /// first block of the chain
    pub open_block: BlockHash,
    /// balance at `head`
    pub balance: Amount,
    /// seconds since the unix epoch of the last update
    pub modified: u64,
    /// number of blocks in the chain
    pub block_count: u64,
}

impl AccountInfo {
    /// Fixed-width binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ACCOUNT_INFO_SIZE_BYTES);
        bytes.extend(self.head.to_bytes());
        bytes.extend(self.rep_block.to_bytes());
        bytes.extend(self.open_block.to_bytes());
        bytes.extend(self.balance.to_raw().to_be_bytes());
        bytes.extend(self.modified.to_le_bytes());
        bytes.extend(self.block_count.to_le_bytes());
        bytes
    }

    /// Decodes exactly `ACCOUNT_INFO_SIZE_BYTES` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<AccountInfo, ModelsError> {
        from_fixed_bytes(&AccountInfoDeserializer::new(), bytes, ACCOUNT_INFO_SIZE_BYTES)
    }
}

/// Serializer for `AccountInfo`
#[derive(Default, Clone)]
pub struct AccountInfoSerializer;

impl AccountInfoSerializer {
    /// Creates a new `AccountInfoSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<AccountInfo> for AccountInfoSerializer {
    fn serialize(&self, value: &AccountInfo, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `AccountInfo`
#[derive(Default, Clone)]
pub struct AccountInfoDeserializer {
    hash_deserializer: HashDeserializer,
    amount_deserializer: AmountDeserializer,
    u64_deserializer: U64LeDeserializer,
}

impl AccountInfoDeserializer {
    /// Creates a new `AccountInfoDeserializer`
    pub const fn new() -> Self {
        Self {
            hash_deserializer: HashDeserializer::new(),
            amount_deserializer: AmountDeserializer::new(),
            u64_deserializer: U64LeDeserializer::new(),
        }
    }
}

impl Deserializer<AccountInfo> for AccountInfoDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], AccountInfo, E> {
        context(
            "Failed AccountInfo deserialization",
            tuple((
                context("Failed head deserialization", |input| {
                    self.hash_deserializer.deserialize(input)
                }),
                context("Failed rep_block deserialization", |input| {
                    self.hash_deserializer.deserialize(input)
                }),
                context("Failed open_block deserialization", |input| {
                    self.hash_deserializer.deserialize(input)
                }),
                context("Failed balance deserialization", |input| {
                    self.amount_deserializer.deserialize(input)
                }),
                context("Failed modified deserialization", |input| {
                    self.u64_deserializer.deserialize(input)
                }),
                context("Failed block_count deserialization", |input| {
                    self.u64_deserializer.deserialize(input)
                }),
            )),
        )
        .map(
            |(head, rep_block, open_block, balance, modified, block_count)| AccountInfo {
                head,
                rep_block,
                open_block,
                balance,
                modified,
                block_count,
            },
        )
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lattice_hash::Hash;

    fn sample() -> AccountInfo {
        AccountInfo {
            head: Hash::compute_from(b"head"),
            rep_block: Hash::compute_from(b"rep"),
            open_block: Hash::compute_from(b"open"),
            balance: Amount::MAX,
            modified: 1_700_000_000,
            block_count: 42,
        }
    }

    #[test]
    fn test_layout() {
        let info = sample();
        let bytes = info.to_bytes();
        assert_eq!(bytes.len(), ACCOUNT_INFO_SIZE_BYTES);
        assert_eq!(&bytes[..32], info.head.to_bytes());
        assert_eq!(&bytes[96..112], &[0xff; 16]);
        assert_eq!(&bytes[120..], &42u64.to_le_bytes());
        assert_eq!(AccountInfo::from_bytes(&bytes).unwrap(), info);
    }

    #[test]
    fn test_size_mismatch() {
        let bytes = sample().to_bytes();
        assert_matches!(
            AccountInfo::from_bytes(&bytes[..127]),
            Err(ModelsError::SizeMismatch {
                expected: 128,
                got: 127
            })
        );
        let mut longer = bytes;
        longer.push(0);
        assert_matches!(
            AccountInfo::from_bytes(&longer),
            Err(ModelsError::SizeMismatch { got: 129, .. })
        );
        assert!(AccountInfo::from_bytes(&[]).is_err());
    }
}
