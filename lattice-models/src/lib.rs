// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Data model of the block lattice: amounts, accounts, the four block
//! variants, the fixed-width ledger records, votes and the per-network
//! genesis.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use error::*;

/// account text form and codec
pub mod account;
/// account chain metadata record
pub mod account_info;
/// raw amounts
pub mod amount;
/// block variants and codecs
pub mod block;
/// balance snapshot record
pub mod block_info;
mod error;
/// genesis open block of a network
pub mod genesis;
/// network variants
pub mod network;
/// receivable records
pub mod pending;
mod record;
/// layered configuration loading
pub mod settings;
/// representative votes
pub mod vote;

