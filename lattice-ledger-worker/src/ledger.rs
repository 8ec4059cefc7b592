// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This file defines the ledger facade answering lattice queries over a store.

use crate::genesis::initialize;
use crate::traversal::{AmountResolver, BalanceResolver, RepresentativeResolver};
use lattice_ledger_exports::{LedgerConfig, LedgerError, LedgerReader, LedgerStore, LedgerWriter};
use lattice_models::{
    account::Account,
    amount::Amount,
    block::{BlockCounts, BlockHash},
    genesis::Genesis,
    pending::{PendingInfo, PendingKey},
};
use tracing::debug;

/// Lattice ledger over a transactional store.
///
/// Every query runs in its own read transaction.
#[derive(Debug)]
pub struct Ledger<S: LedgerStore> {
    /// ledger configuration
    config: LedgerConfig,
    /// genesis of the configured network
    genesis: Genesis,
    /// backing store
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Opens the ledger, seeding the genesis of the configured network when
    /// the store is empty
    pub fn new(config: LedgerConfig, store: S) -> Result<Self, LedgerError> {
        let genesis = Genesis::new(config.network)?;
        {
            let mut writer = store.begin_write();
            let empty = writer.latest_begin().next().is_none();
            if empty {
                initialize(&mut writer, &genesis)?;
                writer.commit();
            } else {
                debug!("ledger already holds accounts, genesis seeding skipped");
            }
        }
        Ok(Ledger {
            config,
            genesis,
            store,
        })
    }

    /// Opens the ledger with the configuration loaded by `LedgerConfig::load`
    pub fn open(store: S) -> Result<Self, LedgerError> {
        Self::new(LedgerConfig::load()?, store)
    }

    /// Configuration the ledger was opened with
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Genesis of the configured network
    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Value transferred by the block `hash`
    pub fn amount(&self, hash: &BlockHash) -> Result<Amount, LedgerError> {
        let reader = self.store.begin_read();
        AmountResolver::new(&reader, &self.genesis).compute(hash)
    }

    /// Balance of the chain once the block `hash` is applied
    pub fn balance(&self, hash: &BlockHash) -> Result<Amount, LedgerError> {
        let reader = self.store.begin_read();
        BalanceResolver::new(&reader, &self.genesis).compute(hash)
    }

    /// Block that set the representative in force at the block `hash`
    pub fn representative(&self, hash: &BlockHash) -> Result<BlockHash, LedgerError> {
        let reader = self.store.begin_read();
        RepresentativeResolver::new(&reader).compute(hash)
    }

    /// Balance recorded for `account`, zero for an unopened account
    pub fn account_balance(&self, account: &Account) -> Amount {
        self.store
            .begin_read()
            .account_get(account)
            .map(|info| info.balance)
            .unwrap_or_default()
    }

    /// Head block of the chain of `account`
    pub fn latest(&self, account: &Account) -> Option<BlockHash> {
        self.store.begin_read().account_get(account).map(|info| info.head)
    }

    /// Voting weight delegated to `account`
    pub fn weight(&self, account: &Account) -> Amount {
        self.store.begin_read().representation_get(account)
    }

    /// Receivables of `account`
    pub fn pending(&self, account: &Account) -> Vec<(PendingKey, PendingInfo)> {
        self.store.begin_read().pending_of(account)
    }

    /// Number of blocks of each type in the chain of `account`
    pub fn chain_counts(&self, account: &Account) -> Result<BlockCounts, LedgerError> {
        let reader = self.store.begin_read();
        let mut counts = BlockCounts::default();
        let mut cursor = match reader.account_get(account) {
            Some(info) => info.head,
            None => return Ok(counts),
        };
        while !cursor.is_zero() {
            let block = reader
                .block_get(&cursor)
                .ok_or(LedgerError::MissingBlock(cursor))?;
            block.visit(&mut counts);
            cursor = block.previous();
        }
        Ok(counts)
    }
}
