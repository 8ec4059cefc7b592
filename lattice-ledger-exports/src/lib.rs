// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! # General description
//!
//! Contract between the ledger core and the transactional store holding the
//! lattice.
//!
//! ## `store.rs`
//! `LedgerReader` and `LedgerWriter` are transaction handles, obtained from a
//! `LedgerStore`. A writer buffers its changes until `commit`, dropping it
//! discards them.
//!
//! ## `config.rs`
//! `LedgerConfig`, selecting the network whose genesis seeds the ledger.
//!
//! ## `error.rs`
//! `LedgerError`. `MissingBlock` and `AmountOverflow` mean the store is
//! corrupt and callers are expected to stop rather than carry on.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod config;
mod error;
mod store;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use store::{LedgerReader, LedgerStore, LedgerWriter};
