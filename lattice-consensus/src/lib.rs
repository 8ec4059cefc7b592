// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! # General description
//!
//! Representative voting on contested roots.
//!
//! A root is the block hash two competing blocks share: the previous block
//! for send, receive and change blocks, the account itself for open blocks.
//! Each root under contest gets a [`Votes`] set recording, per representative,
//! the last block it endorsed. Feeding a vote to the set classifies it as a
//! new endorsement, a repeat, or a switch to another block.
//!
//! [`ActiveElections`] keeps the sets of every root under contest. Votes for
//! one root are applied one at a time, votes for different roots in parallel.
//!
//! Signatures are not checked by [`Votes`]: callers verify them first, or go
//! through [`ActiveElections::vote_verified`].

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod elections;
mod error;
mod votes;

pub use elections::ActiveElections;
pub use error::ConsensusError;
pub use votes::{BlockTally, TallyResult, Voter, Votes};
