// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Amount, balance and representative resolution by walking the lattice
//! backward.
//!
//! Amount and balance depend on each other across accounts: the amount of a
//! send is a balance drop, and a receive adds the amount of a send from
//! another chain. Both run on one explicit work list so that the depth of
//! the lattice never translates into native stack depth.

use lattice_ledger_exports::{LedgerError, LedgerReader};
use lattice_logging::lattice_trace;
use lattice_models::{
    amount::Amount,
    block::{Block, BlockHash},
    genesis::Genesis,
};
use tracing::error;

/// What is being computed
#[derive(Debug, Clone, Copy)]
enum Task {
    /// value transferred by a block
    Amount(BlockHash),
    /// balance at `cursor`, plus `acc` gathered further down the chain
    Balance { cursor: BlockHash, acc: Amount },
}

/// What to do with the value of a finished task
#[derive(Debug, Clone, Copy)]
enum Continuation {
    /// the value is the balance before a send declaring this balance
    Subtract(Amount),
    /// the value is the amount received at some block, the walk goes on at `next`
    Resume { acc: Amount, next: BlockHash },
}

enum Step {
    Done(Amount),
    Next(Task),
}

/// Work-list evaluation shared by the amount and balance resolvers
struct Traversal<'r, R: LedgerReader + ?Sized> {
    reader: &'r R,
    genesis: &'r Genesis,
}

impl<'r, R: LedgerReader + ?Sized> Traversal<'r, R> {
    fn run(&self, mut task: Task) -> Result<Amount, LedgerError> {
        let mut continuations: Vec<Continuation> = Vec::new();
        loop {
            match self.step(task, &mut continuations)? {
                Step::Next(next) => task = next,
                Step::Done(mut value) => loop {
                    match continuations.pop() {
                        None => return Ok(value),
                        Some(Continuation::Subtract(declared)) => {
                            value = value
                                .checked_sub(declared)
                                .ok_or(LedgerError::AmountOverflow)?;
                        }
                        Some(Continuation::Resume { acc, next }) => {
                            task = Task::Balance {
                                cursor: next,
                                acc: add(acc, value)?,
                            };
                            break;
                        }
                    }
                },
            }
        }
    }

    fn step(
        &self,
        task: Task,
        continuations: &mut Vec<Continuation>,
    ) -> Result<Step, LedgerError> {
        let genesis_source = self.genesis.account().to_hash();
        match task {
            Task::Amount(hash) => match self.reader.block_get(&hash) {
                Some(Block::Send(send)) => {
                    continuations.push(Continuation::Subtract(send.hashables.balance));
                    Ok(Step::Next(Task::Balance {
                        cursor: send.hashables.previous,
                        acc: Amount::zero(),
                    }))
                }
                Some(Block::Receive(receive)) => Ok(Step::Next(Task::Amount(receive.hashables.source))),
                Some(Block::Open(open)) if open.hashables.source == genesis_source => {
                    Ok(Step::Done(self.genesis.amount()))
                }
                Some(Block::Open(open)) => Ok(Step::Next(Task::Amount(open.hashables.source))),
                Some(Block::Change(_)) => Ok(Step::Done(Amount::zero())),
                // the genesis account stands in for the source of the genesis block
                None if hash == genesis_source => Ok(Step::Done(self.genesis.amount())),
                None => Err(missing(hash)),
            },
            Task::Balance { mut cursor, acc } => loop {
                if cursor.is_zero() {
                    return Ok(Step::Done(acc));
                }
                match self.reader.block_get(&cursor).ok_or_else(|| missing(cursor))? {
                    Block::Send(send) => return Ok(Step::Done(add(acc, send.hashables.balance)?)),
                    Block::Receive(receive) => {
                        if let Some(info) = self.reader.block_info_get(&cursor) {
                            return Ok(Step::Done(add(acc, info.balance)?));
                        }
                        continuations.push(Continuation::Resume {
                            acc,
                            next: receive.hashables.previous,
                        });
                        return Ok(Step::Next(Task::Amount(receive.hashables.source)));
                    }
                    Block::Open(open) => {
                        continuations.push(Continuation::Resume {
                            acc,
                            next: BlockHash::zero(),
                        });
                        return Ok(Step::Next(Task::Amount(open.hashables.source)));
                    }
                    Block::Change(change) => {
                        if let Some(info) = self.reader.block_info_get(&cursor) {
                            return Ok(Step::Done(add(acc, info.balance)?));
                        }
                        cursor = change.hashables.previous;
                    }
                }
            },
        }
    }
}

fn add(left: Amount, right: Amount) -> Result<Amount, LedgerError> {
    left.checked_add(right).ok_or(LedgerError::AmountOverflow)
}

fn missing(hash: BlockHash) -> LedgerError {
    error!("block {} is referenced but missing from the ledger", hash);
    LedgerError::MissingBlock(hash)
}

/// Value transferred by a block.
///
/// Send blocks move the drop of the sender balance, receive and open blocks
/// the amount of their source, change blocks nothing.
pub struct AmountResolver<'r, R: LedgerReader + ?Sized> {
    traversal: Traversal<'r, R>,
}

impl<'r, R: LedgerReader + ?Sized> AmountResolver<'r, R> {
    /// Resolver reading through `reader`
    pub fn new(reader: &'r R, genesis: &'r Genesis) -> Self {
        AmountResolver {
            traversal: Traversal { reader, genesis },
        }
    }

    /// Amount transferred by the block `hash`
    ///
    /// # Errors
    /// `MissingBlock` and `AmountOverflow` mean a corrupt store
    pub fn compute(&self, hash: &BlockHash) -> Result<Amount, LedgerError> {
        let amount = self.traversal.run(Task::Amount(*hash))?;
        lattice_trace!("ledger.traversal.amount", { "hash": hash.to_string(), "amount": amount.to_string() });
        Ok(amount)
    }
}

/// Balance of an account chain at a given block
pub struct BalanceResolver<'r, R: LedgerReader + ?Sized> {
    traversal: Traversal<'r, R>,
}

impl<'r, R: LedgerReader + ?Sized> BalanceResolver<'r, R> {
    /// Resolver reading through `reader`
    pub fn new(reader: &'r R, genesis: &'r Genesis) -> Self {
        BalanceResolver {
            traversal: Traversal { reader, genesis },
        }
    }

    /// Balance once the block `hash` is applied, zero for the zero hash
    ///
    /// # Errors
    /// `MissingBlock` and `AmountOverflow` mean a corrupt store
    pub fn compute(&self, hash: &BlockHash) -> Result<Amount, LedgerError> {
        let balance = self.traversal.run(Task::Balance {
            cursor: *hash,
            acc: Amount::zero(),
        })?;
        lattice_trace!("ledger.traversal.balance", { "hash": hash.to_string(), "balance": balance.to_string() });
        Ok(balance)
    }
}

/// Block that set the representative in force at a given block
pub struct RepresentativeResolver<'r, R: LedgerReader + ?Sized> {
    reader: &'r R,
}

impl<'r, R: LedgerReader + ?Sized> RepresentativeResolver<'r, R> {
    /// Resolver reading through `reader`
    pub fn new(reader: &'r R) -> Self {
        RepresentativeResolver { reader }
    }

    /// Hash of the nearest open or change block at or before `hash`
    pub fn compute(&self, hash: &BlockHash) -> Result<BlockHash, LedgerError> {
        let mut cursor = *hash;
        loop {
            match self.reader.block_get(&cursor).ok_or_else(|| missing(cursor))? {
                Block::Send(send) => cursor = send.hashables.previous,
                Block::Receive(receive) => cursor = receive.hashables.previous,
                Block::Open(_) | Block::Change(_) => return Ok(cursor),
            }
        }
    }
}
