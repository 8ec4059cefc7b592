// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use lattice_hash::Hash;
use lattice_models::ModelsError;
use thiserror::Error;

/// Consensus error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ConsensusError {
    /// no election is running for root {0}
    NoElection(Hash),
    /// invalid vote: {0}
    InvalidVote(#[from] ModelsError),
}
