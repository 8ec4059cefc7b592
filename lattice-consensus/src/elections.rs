// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::ConsensusError;
use crate::votes::{BlockTally, TallyResult, Votes};
use lattice_models::{account::Account, amount::Amount, block::Block, block::BlockHash, vote::Vote};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Vote sets of the roots under contest
#[derive(Debug, Default)]
pub struct ActiveElections {
    /// one exclusive vote set per root
    roots: RwLock<HashMap<BlockHash, Arc<Mutex<Votes>>>>,
}

impl ActiveElections {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an election on the root of `block`.
    /// Returns false if one is already running for that root.
    pub fn start(&self, block: Arc<Block>) -> bool {
        let root = block.root();
        let mut roots = self.roots.write();
        if roots.contains_key(&root) {
            return false;
        }
        debug!("election started on root {} with block {}", root, block.hash());
        roots.insert(root, Arc::new(Mutex::new(Votes::new(block))));
        true
    }

    fn votes_of(&self, root: &BlockHash) -> Option<Arc<Mutex<Votes>>> {
        self.roots.read().get(root).cloned()
    }

    /// Feeds an already verified vote to the election of its block's root.
    /// `None` when no election runs for that root.
    pub fn vote(&self, vote: &Vote) -> Option<TallyResult> {
        let votes = self.votes_of(&vote.block.root())?;
        let result = votes.lock().vote(vote);
        Some(result)
    }

    /// Checks the vote signature before feeding it
    pub fn vote_verified(&self, vote: &Vote) -> Result<Option<TallyResult>, ConsensusError> {
        vote.verify_signature()?;
        Ok(self.vote(vote))
    }

    /// Weight behind each block competing on `root`, heaviest first
    pub fn tally<F>(&self, root: &BlockHash, weight_of: F) -> Result<Vec<BlockTally>, ConsensusError>
    where
        F: Fn(&Account) -> Amount,
    {
        let votes = self
            .votes_of(root)
            .ok_or(ConsensusError::NoElection(*root))?;
        let tally = votes.lock().tally(weight_of);
        Ok(tally)
    }

    /// Closes the election on `root`, returning its final vote set
    pub fn stop(&self, root: &BlockHash) -> Option<Votes> {
        let votes = self.roots.write().remove(root)?;
        debug!("election stopped on root {}", root);
        let votes = votes.lock().clone();
        Some(votes)
    }

    /// Number of running elections
    pub fn len(&self) -> usize {
        self.roots.read().len()
    }

    /// true if no election is running
    pub fn is_empty(&self) -> bool {
        self.roots.read().is_empty()
    }
}
