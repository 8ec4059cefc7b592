// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! The four block variants of an account chain, their hashing, and their
//! binary and json forms.

use crate::account::{Account, AccountDeserializer};
use crate::amount::{amount_hex, Amount, AmountDeserializer};
use crate::ModelsError;
use lattice_hash::{Hash, HashDeserializer};
use lattice_serialization::{
    DeserializeError, Deserializer, SerializeError, Serializer, U64LeDeserializer, U8Deserializer,
};
use lattice_signature::{KeyPair, Signature, SignatureDeserializer};
use nom::error::{context, ContextError, ErrorKind, ParseError};
use nom::sequence::tuple;
use nom::{IResult, Parser};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Blocks are identified by the hash of their hashables
pub type BlockHash = Hash;

/// Untagged binary size of a send block
pub const SEND_BLOCK_SIZE: usize = 32 + 32 + 16 + 64 + 8;
/// Untagged binary size of a receive block
pub const RECEIVE_BLOCK_SIZE: usize = 32 + 32 + 64 + 8;
/// Untagged binary size of an open block
pub const OPEN_BLOCK_SIZE: usize = 32 + 32 + 32 + 64 + 8;
/// Untagged binary size of a change block
pub const CHANGE_BLOCK_SIZE: usize = 32 + 32 + 64 + 8;

/// Leading byte of a tagged block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// never written by a valid encoder
    Invalid = 0,
    /// marks the absence of a block
    NotABlock = 1,
    /// send
    Send = 2,
    /// receive
    Receive = 3,
    /// open
    Open = 4,
    /// change
    Change = 5,
}

/// Fields of a send block covered by its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendHashables {
    /// previous block of the sender chain
    pub previous: BlockHash,
    /// receiver of the funds
    pub destination: Account,
    /// balance of the sender once the block is applied
    #[serde(with = "amount_hex")]
    pub balance: Amount,
}

/// Moves funds out of an account, the amount is implied by the balance drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBlock {
    /// hashed fields
    #[serde(flatten)]
    pub hashables: SendHashables,
    /// proof of work, opaque to the ledger
    #[serde(with = "work_hex")]
    pub work: u64,
    /// signature of the hash by the account owner
    pub signature: Signature,
}

/// Fields of a receive block covered by its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveHashables {
    /// previous block of the receiver chain
    pub previous: BlockHash,
    /// the send block being pocketed
    pub source: BlockHash,
}

/// Pockets a pending send into an existing chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveBlock {
    /// hashed fields
    #[serde(flatten)]
    pub hashables: ReceiveHashables,
    /// proof of work, opaque to the ledger
    #[serde(with = "work_hex")]
    pub work: u64,
    /// signature of the hash by the account owner
    pub signature: Signature,
}

/// Fields of an open block covered by its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHashables {
    /// the send block being pocketed
    pub source: BlockHash,
    /// first representative of the account
    pub representative: Account,
    /// account whose chain starts here
    pub account: Account,
}

/// First block of an account chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBlock {
    /// hashed fields
    #[serde(flatten)]
    pub hashables: OpenHashables,
    /// proof of work, opaque to the ledger
    #[serde(with = "work_hex")]
    pub work: u64,
    /// signature of the hash by the account owner
    pub signature: Signature,
}

/// Fields of a change block covered by its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeHashables {
    /// previous block of the chain
    pub previous: BlockHash,
    /// new representative of the account
    pub representative: Account,
}

/// Switches the representative of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    /// hashed fields
    #[serde(flatten)]
    pub hashables: ChangeHashables,
    /// proof of work, opaque to the ledger
    #[serde(with = "work_hex")]
    pub work: u64,
    /// signature of the hash by the account owner
    pub signature: Signature,
}

impl SendHashables {
    fn hash(&self) -> BlockHash {
        Hash::compute_from_parts(&[
            &self.previous.to_bytes()[..],
            &self.destination.to_bytes()[..],
            &self.balance.to_raw().to_be_bytes()[..],
        ])
    }
}

impl ReceiveHashables {
    fn hash(&self) -> BlockHash {
        Hash::compute_from_parts(&[&self.previous.to_bytes()[..], &self.source.to_bytes()[..]])
    }
}

impl OpenHashables {
    fn hash(&self) -> BlockHash {
        Hash::compute_from_parts(&[
            &self.source.to_bytes()[..],
            &self.representative.to_bytes()[..],
            &self.account.to_bytes()[..],
        ])
    }
}

impl ChangeHashables {
    fn hash(&self) -> BlockHash {
        Hash::compute_from_parts(&[
            &self.previous.to_bytes()[..],
            &self.representative.to_bytes()[..],
        ])
    }
}

impl SendBlock {
    /// Builds a send block signed by `keypair`
    pub fn new(
        previous: BlockHash,
        destination: Account,
        balance: Amount,
        keypair: &KeyPair,
        work: u64,
    ) -> Self {
        let hashables = SendHashables {
            previous,
            destination,
            balance,
        };
        let signature = keypair.sign(&hashables.hash());
        SendBlock {
            hashables,
            work,
            signature,
        }
    }

    /// hash of the hashables
    pub fn hash(&self) -> BlockHash {
        self.hashables.hash()
    }
}

impl ReceiveBlock {
    /// Builds a receive block signed by `keypair`
    pub fn new(previous: BlockHash, source: BlockHash, keypair: &KeyPair, work: u64) -> Self {
        let hashables = ReceiveHashables { previous, source };
        let signature = keypair.sign(&hashables.hash());
        ReceiveBlock {
            hashables,
            work,
            signature,
        }
    }

    /// hash of the hashables
    pub fn hash(&self) -> BlockHash {
        self.hashables.hash()
    }
}

impl OpenBlock {
    /// Builds an open block signed by `keypair`
    pub fn new(
        source: BlockHash,
        representative: Account,
        account: Account,
        keypair: &KeyPair,
        work: u64,
    ) -> Self {
        let hashables = OpenHashables {
            source,
            representative,
            account,
        };
        let signature = keypair.sign(&hashables.hash());
        OpenBlock {
            hashables,
            work,
            signature,
        }
    }

    /// hash of the hashables
    pub fn hash(&self) -> BlockHash {
        self.hashables.hash()
    }
}

impl ChangeBlock {
    /// Builds a change block signed by `keypair`
    pub fn new(
        previous: BlockHash,
        representative: Account,
        keypair: &KeyPair,
        work: u64,
    ) -> Self {
        let hashables = ChangeHashables {
            previous,
            representative,
        };
        let signature = keypair.sign(&hashables.hash());
        ChangeBlock {
            hashables,
            work,
            signature,
        }
    }

    /// hash of the hashables
    pub fn hash(&self) -> BlockHash {
        self.hashables.hash()
    }
}

/// Double dispatch over the block variants
pub trait BlockVisitor {
    /// called for a send block
    fn send_block(&mut self, block: &SendBlock);
    /// called for a receive block
    fn receive_block(&mut self, block: &ReceiveBlock);
    /// called for an open block
    fn open_block(&mut self, block: &OpenBlock);
    /// called for a change block
    fn change_block(&mut self, block: &ChangeBlock);
}

/// Any block of an account chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// send
    Send(SendBlock),
    /// receive
    Receive(ReceiveBlock),
    /// open
    Open(OpenBlock),
    /// change
    Change(ChangeBlock),
}

impl Block {
    /// Blake2b-256 of the hashables, signature and work excluded
    pub fn hash(&self) -> BlockHash {
        match self {
            Block::Send(block) => block.hash(),
            Block::Receive(block) => block.hash(),
            Block::Open(block) => block.hash(),
            Block::Change(block) => block.hash(),
        }
    }

    /// Tag written in front of the binary form
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
        }
    }

    /// Previous block of the chain, zero for an open block
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Send(block) => block.hashables.previous,
            Block::Receive(block) => block.hashables.previous,
            Block::Open(_) => BlockHash::zero(),
            Block::Change(block) => block.hashables.previous,
        }
    }

    /// Chain position competed on: the account for an open block, the previous block otherwise
    pub fn root(&self) -> BlockHash {
        match self {
            Block::Open(block) => block.hashables.account.to_hash(),
            _ => self.previous(),
        }
    }

    /// The send block pocketed by a receive or open block
    pub fn source(&self) -> Option<BlockHash> {
        match self {
            Block::Receive(block) => Some(block.hashables.source),
            Block::Open(block) => Some(block.hashables.source),
            Block::Send(_) | Block::Change(_) => None,
        }
    }

    /// Representative set by an open or change block
    pub fn representative(&self) -> Option<Account> {
        match self {
            Block::Open(block) => Some(block.hashables.representative),
            Block::Change(block) => Some(block.hashables.representative),
            Block::Send(_) | Block::Receive(_) => None,
        }
    }

    /// Signature of the block
    pub fn signature(&self) -> &Signature {
        match self {
            Block::Send(block) => &block.signature,
            Block::Receive(block) => &block.signature,
            Block::Open(block) => &block.signature,
            Block::Change(block) => &block.signature,
        }
    }

    /// Proof of work of the block
    pub fn work(&self) -> u64 {
        match self {
            Block::Send(block) => block.work,
            Block::Receive(block) => block.work,
            Block::Open(block) => block.work,
            Block::Change(block) => block.work,
        }
    }

    /// Replaces the signature with the one of `keypair` over `hash()`
    pub fn sign(&mut self, keypair: &KeyPair) {
        let signature = keypair.sign(&self.hash());
        match self {
            Block::Send(block) => block.signature = signature,
            Block::Receive(block) => block.signature = signature,
            Block::Open(block) => block.signature = signature,
            Block::Change(block) => block.signature = signature,
        }
    }

    /// Calls the visitor callback matching the variant
    pub fn visit<V: BlockVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Block::Send(block) => visitor.send_block(block),
            Block::Receive(block) => visitor.receive_block(block),
            Block::Open(block) => visitor.open_block(block),
            Block::Change(block) => visitor.change_block(block),
        }
    }

    /// Tagged binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(1 + OPEN_BLOCK_SIZE);
        buffer.push(self.block_type().into());
        write_untagged(self, &mut buffer);
        buffer
    }

    /// Parses a tagged block that must span the whole buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Block, ModelsError> {
        let (rest, block) = BlockDeserializer::new()
            .deserialize::<DeserializeError>(bytes)
            .map_err(|err| ModelsError::DeserializeError(err.to_string()))?;
        if !rest.is_empty() {
            return Err(ModelsError::DeserializeError(format!(
                "{} trailing bytes after block",
                rest.len()
            )));
        }
        Ok(block)
    }

    /// Pretty printed json document
    pub fn to_json(&self) -> Result<String, ModelsError> {
        serde_json::to_string_pretty(self).map_err(|err| ModelsError::BlockJsonError(err.to_string()))
    }

    /// Parses the json document of a block
    pub fn from_json(json: &str) -> Result<Block, ModelsError> {
        serde_json::from_str(json).map_err(|err| ModelsError::BlockJsonError(err.to_string()))
    }
}

fn write_untagged(block: &Block, buffer: &mut Vec<u8>) {
    match block {
        Block::Send(block) => {
            buffer.extend(block.hashables.previous.to_bytes());
            buffer.extend(block.hashables.destination.to_bytes());
            buffer.extend(block.hashables.balance.to_raw().to_be_bytes());
            buffer.extend(block.signature.to_bytes());
            buffer.extend(block.work.to_le_bytes());
        }
        Block::Receive(block) => {
            buffer.extend(block.hashables.previous.to_bytes());
            buffer.extend(block.hashables.source.to_bytes());
            buffer.extend(block.signature.to_bytes());
            buffer.extend(block.work.to_le_bytes());
        }
        Block::Open(block) => {
            buffer.extend(block.hashables.source.to_bytes());
            buffer.extend(block.hashables.representative.to_bytes());
            buffer.extend(block.hashables.account.to_bytes());
            buffer.extend(block.signature.to_bytes());
            buffer.extend(block.work.to_le_bytes());
        }
        Block::Change(block) => {
            buffer.extend(block.hashables.previous.to_bytes());
            buffer.extend(block.hashables.representative.to_bytes());
            buffer.extend(block.signature.to_bytes());
            buffer.extend(block.work.to_le_bytes());
        }
    }
}

/// Counts blocks per variant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockCounts {
    /// send blocks
    pub send: u64,
    /// receive blocks
    pub receive: u64,
    /// open blocks
    pub open: u64,
    /// change blocks
    pub change: u64,
}

impl BlockCounts {
    /// Blocks of every variant
    pub fn sum(&self) -> u64 {
        self.send + self.receive + self.open + self.change
    }
}

impl BlockVisitor for BlockCounts {
    fn send_block(&mut self, _block: &SendBlock) {
        self.send += 1;
    }

    fn receive_block(&mut self, _block: &ReceiveBlock) {
        self.receive += 1;
    }

    fn open_block(&mut self, _block: &OpenBlock) {
        self.open += 1;
    }

    fn change_block(&mut self, _block: &ChangeBlock) {
        self.change += 1;
    }
}

/// Serde helpers writing work as 16 lowercase hexadecimal characters
pub(crate) mod work_hex {
    pub fn serialize<S: serde::Serializer>(work: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{:016x}", work))
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let text: String = serde::Deserialize::deserialize(d)?;
        u64::from_str_radix(&text, 16).map_err(serde::de::Error::custom)
    }
}

/// Serializer for `Block`, with or without the leading type tag
#[derive(Clone)]
pub struct BlockSerializer {
    with_type: bool,
}

impl BlockSerializer {
    /// Writes the type tag then the block
    pub const fn new() -> Self {
        Self { with_type: true }
    }

    /// Writes only the block, the reader must know its type
    pub const fn untagged() -> Self {
        Self { with_type: false }
    }
}

impl Default for BlockSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Block> for BlockSerializer {
    /// ## Example
    /// ```rust
    /// use lattice_models::block::{Block, BlockSerializer, ChangeBlock, CHANGE_BLOCK_SIZE};
    /// use lattice_models::account::Account;
    /// use lattice_hash::Hash;
    /// use lattice_serialization::Serializer;
    /// use lattice_signature::KeyPair;
    ///
    /// let keypair = KeyPair::generate();
    /// let block = Block::Change(ChangeBlock::new(Hash::zero(), Account::BURN, &keypair, 0));
    /// let mut buffer = Vec::new();
    /// BlockSerializer::new().serialize(&block, &mut buffer).unwrap();
    /// assert_eq!(buffer.len(), 1 + CHANGE_BLOCK_SIZE);
    /// ```
    fn serialize(&self, value: &Block, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        if self.with_type {
            buffer.push(value.block_type().into());
        }
        write_untagged(value, buffer);
        Ok(())
    }
}

/// Deserializer for `Block`
#[derive(Clone)]
pub struct BlockDeserializer {
    block_type: Option<BlockType>,
    type_deserializer: U8Deserializer,
    hash_deserializer: HashDeserializer,
    account_deserializer: AccountDeserializer,
    amount_deserializer: AmountDeserializer,
    signature_deserializer: SignatureDeserializer,
    work_deserializer: U64LeDeserializer,
}

impl BlockDeserializer {
    /// Reads the type tag then the block
    pub const fn new() -> Self {
        Self::build(None)
    }

    /// Reads an untagged block of a known type
    pub const fn with_type(block_type: BlockType) -> Self {
        Self::build(Some(block_type))
    }

    const fn build(block_type: Option<BlockType>) -> Self {
        Self {
            block_type,
            type_deserializer: U8Deserializer::new(),
            hash_deserializer: HashDeserializer::new(),
            account_deserializer: AccountDeserializer::new(),
            amount_deserializer: AmountDeserializer::new(),
            signature_deserializer: SignatureDeserializer::new(),
            work_deserializer: U64LeDeserializer::new(),
        }
    }

    fn deserialize_send<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        context(
            "Failed send block deserialization",
            tuple((
                |input| self.hash_deserializer.deserialize(input),
                |input| self.account_deserializer.deserialize(input),
                |input| self.amount_deserializer.deserialize(input),
                |input| self.signature_deserializer.deserialize(input),
                |input| self.work_deserializer.deserialize(input),
            )),
        )
        .map(|(previous, destination, balance, signature, work)| {
            Block::Send(SendBlock {
                hashables: SendHashables {
                    previous,
                    destination,
                    balance,
                },
                work,
                signature,
            })
        })
        .parse(buffer)
    }

    fn deserialize_receive<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        context(
            "Failed receive block deserialization",
            tuple((
                |input| self.hash_deserializer.deserialize(input),
                |input| self.hash_deserializer.deserialize(input),
                |input| self.signature_deserializer.deserialize(input),
                |input| self.work_deserializer.deserialize(input),
            )),
        )
        .map(|(previous, source, signature, work)| {
            Block::Receive(ReceiveBlock {
                hashables: ReceiveHashables { previous, source },
                work,
                signature,
            })
        })
        .parse(buffer)
    }

    fn deserialize_open<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        context(
            "Failed open block deserialization",
            tuple((
                |input| self.hash_deserializer.deserialize(input),
                |input| self.account_deserializer.deserialize(input),
                |input| self.account_deserializer.deserialize(input),
                |input| self.signature_deserializer.deserialize(input),
                |input| self.work_deserializer.deserialize(input),
            )),
        )
        .map(|(source, representative, account, signature, work)| {
            Block::Open(OpenBlock {
                hashables: OpenHashables {
                    source,
                    representative,
                    account,
                },
                work,
                signature,
            })
        })
        .parse(buffer)
    }

    fn deserialize_change<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        context(
            "Failed change block deserialization",
            tuple((
                |input| self.hash_deserializer.deserialize(input),
                |input| self.account_deserializer.deserialize(input),
                |input| self.signature_deserializer.deserialize(input),
                |input| self.work_deserializer.deserialize(input),
            )),
        )
        .map(|(previous, representative, signature, work)| {
            Block::Change(ChangeBlock {
                hashables: ChangeHashables {
                    previous,
                    representative,
                },
                work,
                signature,
            })
        })
        .parse(buffer)
    }
}

impl Default for BlockDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer<Block> for BlockDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        let (rest, block_type) = match self.block_type {
            Some(block_type) => (buffer, block_type),
            None => {
                let (rest, tag) = context("Failed block type deserialization", |input: &'a [u8]| {
                    self.type_deserializer.deserialize(input)
                })(buffer)?;
                let block_type = BlockType::try_from(tag).map_err(|_| {
                    nom::Err::Error(E::add_context(
                        buffer,
                        "Unknown block type",
                        E::from_error_kind(buffer, ErrorKind::Tag),
                    ))
                })?;
                (rest, block_type)
            }
        };
        match block_type {
            BlockType::Send => self.deserialize_send(rest),
            BlockType::Receive => self.deserialize_receive(rest),
            BlockType::Open => self.deserialize_open(rest),
            BlockType::Change => self.deserialize_change(rest),
            BlockType::Invalid | BlockType::NotABlock => Err(nom::Err::Error(E::add_context(
                buffer,
                "Block type carries no block",
                E::from_error_kind(buffer, ErrorKind::Tag),
            ))),
        }
    }
}
