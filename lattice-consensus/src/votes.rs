// Copyright (c) 2022 MASSA LABS <info@massa.net>

use lattice_logging::lattice_trace;
use lattice_models::{account::Account, amount::Amount, block::Block, block::BlockHash, vote::Vote};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Classification of a vote fed to a `Votes` set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyResult {
    /// first vote of the representative on this root, the endorsement is recorded
    Vote,
    /// the representative switched to another block, the endorsement is replaced
    Changed,
    /// the representative already endorsed this block, nothing changed
    Confirm,
}

/// Holder of an endorsement in a `Votes` set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voter {
    /// placeholder bound to the first block seen for the root, weighs nothing
    Sentinel,
    /// a representative account
    Representative(Account),
}

/// Aggregated weight behind one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTally {
    /// sum of the weights of the representatives endorsing `block`
    pub weight: Amount,
    /// endorsed block
    pub block: Arc<Block>,
}

/// Last endorsement of every representative for one root.
///
/// Never empty: the sentinel entry is inserted at construction.
#[derive(Debug, Clone)]
pub struct Votes {
    /// contested root
    id: BlockHash,
    /// endorsed block per voter
    rep_votes: HashMap<Voter, Arc<Block>>,
}

impl Votes {
    /// Opens the set for the root of `block`, which the sentinel endorses
    pub fn new(block: Arc<Block>) -> Self {
        let id = block.root();
        let mut rep_votes = HashMap::new();
        rep_votes.insert(Voter::Sentinel, block);
        Votes { id, rep_votes }
    }

    /// Root this set tallies
    pub fn id(&self) -> BlockHash {
        self.id
    }

    /// Records `vote`, whose signature must already be verified.
    ///
    /// The vote must be for a block on this root, it is not checked here.
    /// Blocks are compared as a whole: a copy of the endorsed block with other
    /// work or signature replaces it and counts as `Changed`.
    pub fn vote(&mut self, vote: &Vote) -> TallyResult {
        let voter = Voter::Representative(vote.account);
        let block_hash = vote.block.hash();
        let result = match self.rep_votes.get(&voter) {
            None => {
                self.rep_votes.insert(voter, vote.block.clone());
                TallyResult::Vote
            }
            Some(current) if **current == *vote.block => TallyResult::Confirm,
            Some(_) => {
                self.rep_votes.insert(voter, vote.block.clone());
                TallyResult::Changed
            }
        };
        if result != TallyResult::Confirm {
            debug!(
                "{:?} from {} on root {} for block {}",
                result, vote.account, self.id, block_hash
            );
        }
        lattice_trace!("consensus.votes.vote", {
            "root": self.id.to_string(),
            "account": vote.account.to_string(),
            "block": block_hash.to_string(),
            "sequence": vote.sequence,
            "result": format!("{:?}", result)
        });
        result
    }

    /// Block currently endorsed by `account`
    pub fn endorsement(&self, account: &Account) -> Option<&Arc<Block>> {
        self.rep_votes.get(&Voter::Representative(*account))
    }

    /// Number of entries, sentinel included
    pub fn len(&self) -> usize {
        self.rep_votes.len()
    }

    /// Always false, the sentinel is never removed
    pub fn is_empty(&self) -> bool {
        self.rep_votes.is_empty()
    }

    /// Weight behind every endorsed block, heaviest first.
    ///
    /// Ties are ordered by block hash so the result does not depend on
    /// insertion order.
    pub fn tally<F>(&self, weight_of: F) -> Vec<BlockTally>
    where
        F: Fn(&Account) -> Amount,
    {
        let mut totals: HashMap<BlockHash, BlockTally> = HashMap::new();
        for (voter, block) in &self.rep_votes {
            let weight = match voter {
                Voter::Sentinel => Amount::zero(),
                Voter::Representative(account) => weight_of(account),
            };
            let entry = totals.entry(block.hash()).or_insert_with(|| BlockTally {
                weight: Amount::zero(),
                block: block.clone(),
            });
            entry.weight = entry.weight.saturating_add(weight);
        }
        let mut result: Vec<(BlockHash, BlockTally)> = totals.into_iter().collect();
        result.sort_by(|(hash_a, a), (hash_b, b)| {
            b.weight.cmp(&a.weight).then_with(|| hash_a.cmp(hash_b))
        });
        result.into_iter().map(|(_, tally)| tally).collect()
    }
}
