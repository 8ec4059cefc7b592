// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::account::{Account, AccountDeserializer};
use crate::block::{Block, BlockDeserializer, BlockSerializer, BlockType};
use crate::ModelsError;
use lattice_hash::Hash;
use lattice_serialization::{
    Deserializer, SerializeError, Serializer, U64LeDeserializer, U64LeSerializer,
};
use lattice_signature::{KeyPair, Signature, SignatureDeserializer};
use nom::error::{context, ContextError, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use serde_json::json;
use std::sync::Arc;

/// A representative endorsing a block for the root it competes on.
/// The block is shared with every other holder of the same vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// voting representative
    pub account: Account,
    /// signature of `hash()` by the representative
    pub signature: Signature,
    /// increases with each new vote of the representative
    pub sequence: u64,
    /// endorsed block
    pub block: Arc<Block>,
}

impl Vote {
    /// Builds a vote signed by `keypair`
    pub fn new(account: Account, keypair: &KeyPair, sequence: u64, block: Arc<Block>) -> Self {
        let mut vote = Vote {
            account,
            signature: Signature::default(),
            sequence,
            block,
        };
        vote.signature = keypair.sign(&vote.hash());
        vote
    }

    /// Blake2b-256 of the block hash followed by the little-endian sequence
    pub fn hash(&self) -> Hash {
        Hash::compute_from_parts(&[
            &self.block.hash().to_bytes()[..],
            &self.sequence.to_le_bytes()[..],
        ])
    }

    /// Checks the signature against the voting account
    pub fn verify_signature(&self) -> Result<(), ModelsError> {
        self.account.verify_signature(&self.hash(), &self.signature)
    }

    /// Json document with the block nested as an object
    pub fn to_json(&self) -> Result<String, ModelsError> {
        let block = serde_json::to_value(self.block.as_ref())
            .map_err(|err| ModelsError::BlockJsonError(err.to_string()))?;
        let document = json!({
            "account": self.account.to_string(),
            "signature": self.signature.to_string(),
            "sequence": self.sequence.to_string(),
            "block": block,
        });
        serde_json::to_string_pretty(&document)
            .map_err(|err| ModelsError::BlockJsonError(err.to_string()))
    }
}

/// Serializer for `Vote`
#[derive(Clone, Default)]
pub struct VoteSerializer {
    sequence_serializer: U64LeSerializer,
    block_serializer: BlockSerializer,
}

impl VoteSerializer {
    /// The block is written with its type tag
    pub const fn new() -> Self {
        Self {
            sequence_serializer: U64LeSerializer::new(),
            block_serializer: BlockSerializer::new(),
        }
    }

    /// The block is written without its type tag
    pub const fn untagged() -> Self {
        Self {
            sequence_serializer: U64LeSerializer::new(),
            block_serializer: BlockSerializer::untagged(),
        }
    }
}

impl Serializer<Vote> for VoteSerializer {
    fn serialize(&self, value: &Vote, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.account.to_bytes());
        buffer.extend(value.signature.to_bytes());
        self.sequence_serializer.serialize(&value.sequence, buffer)?;
        self.block_serializer.serialize(&value.block, buffer)
    }
}

/// Deserializer for `Vote`
#[derive(Clone, Default)]
pub struct VoteDeserializer {
    account_deserializer: AccountDeserializer,
    signature_deserializer: SignatureDeserializer,
    sequence_deserializer: U64LeDeserializer,
    block_deserializer: BlockDeserializer,
}

impl VoteDeserializer {
    /// Expects the block type tag
    pub const fn new() -> Self {
        Self::build(BlockDeserializer::new())
    }

    /// The block type is known from the context, no tag is read
    pub const fn with_block_type(block_type: BlockType) -> Self {
        Self::build(BlockDeserializer::with_type(block_type))
    }

    const fn build(block_deserializer: BlockDeserializer) -> Self {
        Self {
            account_deserializer: AccountDeserializer::new(),
            signature_deserializer: SignatureDeserializer::new(),
            sequence_deserializer: U64LeDeserializer::new(),
            block_deserializer,
        }
    }
}

impl Deserializer<Vote> for VoteDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Vote, E> {
        context(
            "Failed Vote deserialization",
            tuple((
                |input| self.account_deserializer.deserialize(input),
                |input| self.signature_deserializer.deserialize(input),
                |input| self.sequence_deserializer.deserialize(input),
                |input| self.block_deserializer.deserialize(input),
            )),
        )
        .map(|(account, signature, sequence, block)| Vote {
            account,
            signature,
            sequence,
            block: Arc::new(block),
        })
        .parse(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{ChangeBlock, ReceiveBlock};
    use lattice_serialization::DeserializeError;

    fn sample_vote(keypair: &KeyPair) -> Vote {
        let block = Block::Receive(ReceiveBlock::new(
            Hash::compute_from(b"previous"),
            Hash::compute_from(b"source"),
            keypair,
            3,
        ));
        Vote::new(
            Account::from_public_key(keypair.get_public_key()),
            keypair,
            12,
            Arc::new(block),
        )
    }

    #[test]
    fn test_hash_covers_block_and_sequence() {
        let vote = sample_vote(&KeyPair::generate());
        let expected = Hash::compute_from_parts(&[
            &vote.block.hash().to_bytes()[..],
            &[12, 0, 0, 0, 0, 0, 0, 0][..],
        ]);
        assert_eq!(vote.hash(), expected);
        let mut later = vote.clone();
        later.sequence += 1;
        assert_ne!(later.hash(), vote.hash());
    }

    #[test]
    fn test_signature() {
        let keypair = KeyPair::generate();
        let mut vote = sample_vote(&keypair);
        assert!(vote.verify_signature().is_ok());
        vote.sequence += 1;
        assert!(vote.verify_signature().is_err());
    }

    #[test]
    fn test_binary_forms() {
        let vote = sample_vote(&KeyPair::generate());

        let mut tagged = Vec::new();
        VoteSerializer::new().serialize(&vote, &mut tagged).unwrap();
        assert_eq!(&tagged[..32], vote.account.to_bytes());
        assert_eq!(tagged[104], u8::from(BlockType::Receive));
        let (rest, parsed) = VoteDeserializer::new()
            .deserialize::<DeserializeError>(&tagged)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, vote);

        let mut untagged = Vec::new();
        VoteSerializer::untagged()
            .serialize(&vote, &mut untagged)
            .unwrap();
        assert_eq!(untagged.len() + 1, tagged.len());
        let (rest, parsed) = VoteDeserializer::with_block_type(BlockType::Receive)
            .deserialize::<DeserializeError>(&untagged)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, vote);
        assert!(VoteDeserializer::with_block_type(BlockType::Open)
            .deserialize::<DeserializeError>(&untagged)
            .is_err());
    }

    #[test]
    fn test_json_export() {
        let keypair = KeyPair::generate();
        let account = Account::from_public_key(keypair.get_public_key());
        let block = Block::Change(ChangeBlock::new(Hash::zero(), account, &keypair, 0));
        let vote = Vote::new(account, &keypair, u64::MAX, Arc::new(block));
        let value: serde_json::Value = serde_json::from_str(&vote.to_json().unwrap()).unwrap();
        assert_eq!(value["account"], account.to_string());
        assert_eq!(value["sequence"], u64::MAX.to_string());
        assert_eq!(value["signature"], vote.signature.to_string());
        assert_eq!(value["block"]["type"], "change");
    }
}
