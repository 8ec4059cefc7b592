// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::account::{Account, AccountDeserializer};
use crate::amount::{Amount, AmountDeserializer};
use crate::record::from_fixed_bytes;
use crate::ModelsError;
use lattice_serialization::{Deserializer, SerializeError, Serializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

/// Width of an encoded `BlockInfo`
pub const BLOCK_INFO_SIZE_BYTES: usize = 32 + 16;

/// Balance snapshot of an account at a given block.
/// Absence only means the balance has to be walked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// owner of the block
    pub account: Account,
    /// balance once the block is applied
    pub balance: Amount,
}

impl BlockInfo {
    /// Fixed-width binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(BLOCK_INFO_SIZE_BYTES);
        bytes.extend(self.account.to_bytes());
        bytes.extend(self.balance.to_raw().to_be_bytes());
        bytes
    }

    /// Decodes exactly `BLOCK_INFO_SIZE_BYTES` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<BlockInfo, ModelsError> {
        from_fixed_bytes(&BlockInfoDeserializer::new(), bytes, BLOCK_INFO_SIZE_BYTES)
    }
}

/// Serializer for `BlockInfo`
#[derive(Default, Clone)]
pub struct BlockInfoSerializer;

impl BlockInfoSerializer {
    /// Creates a new `BlockInfoSerializer`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<BlockInfo> for BlockInfoSerializer {
    fn serialize(&self, value: &BlockInfo, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `BlockInfo`
#[derive(Default, Clone)]
pub struct BlockInfoDeserializer {
    account_deserializer: AccountDeserializer,
    amount_deserializer: AmountDeserializer,
}

impl BlockInfoDeserializer {
    /// Creates a new `BlockInfoDeserializer`
    pub const fn new() -> Self {
        Self {
            account_deserializer: AccountDeserializer::new(),
            amount_deserializer: AmountDeserializer::new(),
        }
    }
}

impl Deserializer<BlockInfo> for BlockInfoDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], BlockInfo, E> {
        context(
            "Failed BlockInfo deserialization",
            tuple((
                |input| self.account_deserializer.deserialize(input),
                |input| self.amount_deserializer.deserialize(input),
            )),
        )
        .map(|(account, balance)| BlockInfo { account, balance })
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_block_info() {
        let info = BlockInfo {
            account: Account::from_bytes(&[3u8; 32]),
            balance: Amount::from_raw(u128::MAX - 1),
        };
        let bytes = info.to_bytes();
        assert_eq!(bytes.len(), BLOCK_INFO_SIZE_BYTES);
        assert_eq!(BlockInfo::from_bytes(&bytes).unwrap(), info);
        assert_matches!(
            BlockInfo::from_bytes(&bytes[..47]),
            Err(ModelsError::SizeMismatch {
                expected: 48,
                got: 47
            })
        );
    }
}
