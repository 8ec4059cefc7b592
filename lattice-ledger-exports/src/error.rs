// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use lattice_hash::Hash;
use lattice_models::ModelsError;
use thiserror::Error;

/// Ledger errors
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum LedgerError {
    /// block {0} is referenced by the lattice but missing from the store
    MissingBlock(Hash),
    /// amount out of range while walking the lattice
    AmountOverflow,
    /// genesis can only seed an empty ledger
    NotEmpty,
    /// models error: {0}
    ModelsError(#[from] ModelsError),
}
