// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! # General description
//!
//! This crate derives balances, transferred amounts and representatives from
//! the block lattice, and seeds an empty ledger with its genesis.
//!
//! # Architecture
//!
//! ## `traversal.rs`
//! `AmountResolver`, `BalanceResolver` and `RepresentativeResolver` walk the
//! lattice backward through a `LedgerReader`.
//!
//! ## `genesis.rs`
//! One-time seeding of an empty ledger with the genesis open block.
//!
//! ## `ledger_db.rs`
//! `MemoryLedgerDB`, an in-memory implementation of `LedgerStore`.
//!
//! ## `ledger.rs`
//! `Ledger`, the facade bundling a store with the configured genesis.
//!
//! ## Test exports
//!
//! When the crate feature `test-exports` is enabled, `ChainBuilder` is
//! exported to build consistent lattices. See `test_exports/mod.rs`.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod genesis;
mod ledger;
mod ledger_db;
mod traversal;

pub use genesis::initialize;
pub use ledger::Ledger;
pub use ledger_db::{MemoryLedgerDB, MemoryReader, MemoryWriter};
pub use traversal::{AmountResolver, BalanceResolver, RepresentativeResolver};

#[cfg(test)]
mod tests;

#[cfg(any(test, feature = "test-exports"))]
pub mod test_exports;
