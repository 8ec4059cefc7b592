// Copyright (c) 2022 MASSA LABS <info@massa.net>

use lattice_models::{
    account::Account,
    account_info::AccountInfo,
    amount::Amount,
    block::{Block, BlockHash},
    block_info::BlockInfo,
    pending::{PendingInfo, PendingKey},
};

/// Read access to the lattice, scoped to one transaction.
/// Every lookup of a single transaction sees the same snapshot.
pub trait LedgerReader {
    /// Block stored under `hash`
    fn block_get(&self, hash: &BlockHash) -> Option<Block>;

    /// Checks if a block is stored under `hash`
    fn block_exists(&self, hash: &BlockHash) -> bool {
        self.block_get(hash).is_some()
    }

    /// Balance snapshot recorded at the block `hash`, if any
    fn block_info_get(&self, hash: &BlockHash) -> Option<BlockInfo>;

    /// Metadata of the chain of `account`
    fn account_get(&self, account: &Account) -> Option<AccountInfo>;

    /// Receivable stored under `key`
    fn pending_get(&self, key: &PendingKey) -> Option<PendingInfo>;

    /// Every receivable of `account`, ordered by send block hash
    fn pending_of(&self, account: &Account) -> Vec<(PendingKey, PendingInfo)>;

    /// Voting weight delegated to `account`, zero when nothing was recorded
    fn representation_get(&self, account: &Account) -> Amount;

    /// Account whose head block is `hash`
    fn frontier_get(&self, hash: &BlockHash) -> Option<Account>;

    /// Checksum stored for the `(prefix, mask)` range
    fn checksum_get(&self, prefix: u64, mask: u8) -> Option<BlockHash>;

    /// Every account with its metadata, in account order.
    /// An empty iterator means an empty ledger.
    fn latest_begin(&self) -> Box<dyn Iterator<Item = (Account, AccountInfo)> + '_>;
}

/// Read-write transaction.
/// Changes are only visible to other transactions once committed.
pub trait LedgerWriter: LedgerReader {
    /// Stores `block` under `hash`
    fn block_put(&mut self, hash: &BlockHash, block: &Block);

    /// Records the balance snapshot of the block `hash`
    fn block_info_put(&mut self, hash: &BlockHash, info: &BlockInfo);

    /// Sets the metadata of the chain of `account`
    fn account_put(&mut self, account: &Account, info: &AccountInfo);

    /// Stores a receivable
    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo);

    /// Removes a receivable
    fn pending_del(&mut self, key: &PendingKey);

    /// Sets the voting weight delegated to `account`
    fn representation_put(&mut self, account: &Account, weight: Amount);

    /// Stores the checksum of the `(prefix, mask)` range
    fn checksum_put(&mut self, prefix: u64, mask: u8, hash: &BlockHash);

    /// Records `account` as the owner of the head block `hash`
    fn frontier_put(&mut self, hash: &BlockHash, account: &Account);

    /// Removes a frontier entry once its block is no longer a head
    fn frontier_del(&mut self, hash: &BlockHash);

    /// Atomically applies every change of the transaction
    fn commit(self)
    where
        Self: Sized;
}

/// Transactional store of the lattice.
///
/// Readers run concurrently. At most one writer exists at a time and readers
/// never observe a writer that has not committed.
pub trait LedgerStore: Send + Sync {
    /// read transaction handle
    type Reader<'a>: LedgerReader
    where
        Self: 'a;
    /// read-write transaction handle
    type Writer<'a>: LedgerWriter
    where
        Self: 'a;

    /// Opens a read transaction
    fn begin_read(&self) -> Self::Reader<'_>;

    /// Opens a read-write transaction, waiting for the current writer to finish
    fn begin_write(&self) -> Self::Writer<'_>;
}

/// A shared store is a store
impl<S: LedgerStore> LedgerStore for std::sync::Arc<S> {
    type Reader<'a> = S::Reader<'a> where Self: 'a;
    type Writer<'a> = S::Writer<'a> where Self: 'a;

    fn begin_read(&self) -> Self::Reader<'_> {
        self.as_ref().begin_read()
    }

    fn begin_write(&self) -> Self::Writer<'_> {
        self.as_ref().begin_write()
    }
}
