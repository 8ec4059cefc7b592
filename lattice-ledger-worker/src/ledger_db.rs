// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! In-memory transactional store of the lattice.
//!
//! Records are kept in their fixed-width binary form, one ordered byte table
//! per column family, so that the store behaves like the key-value backend it
//! stands in for.

use lattice_hash::{Hash, HASH_SIZE_BYTES};
use lattice_ledger_exports::{LedgerReader, LedgerStore, LedgerWriter};
use lattice_models::{
    account::Account,
    account_info::AccountInfo,
    amount::Amount,
    block::{Block, BlockHash},
    block_info::BlockInfo,
    pending::{PendingInfo, PendingKey},
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard};
use std::collections::BTreeMap;
use std::fmt::Debug;

const BLOCKS_CF: &str = "blocks";
const BLOCK_INFO_CF: &str = "block_info";
const ACCOUNTS_CF: &str = "accounts";
const PENDING_CF: &str = "pending";
const REPRESENTATION_CF: &str = "representation";
const FRONTIERS_CF: &str = "frontiers";
const CHECKSUM_CF: &str = "checksum";
const COLUMN_FAMILIES: [&str; 7] = [
    BLOCKS_CF,
    BLOCK_INFO_CF,
    ACCOUNTS_CF,
    PENDING_CF,
    REPRESENTATION_CF,
    FRONTIERS_CF,
    CHECKSUM_CF,
];

const CF_ERROR: &str = "critical: column family missing";
const BLOCK_DESER_ERROR: &str = "critical: stored block is corrupted";
const BLOCK_INFO_DESER_ERROR: &str = "critical: stored block info is corrupted";
const ACCOUNT_INFO_DESER_ERROR: &str = "critical: stored account info is corrupted";
const PENDING_DESER_ERROR: &str = "critical: stored pending entry is corrupted";
const KEY_DESER_ERROR: &str = "critical: stored key is corrupted";
const AMOUNT_DESER_ERROR: &str = "critical: stored amount is corrupted";

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// Committed content of the store
#[derive(Debug)]
struct Tables {
    column_families: BTreeMap<&'static str, Table>,
}

impl Tables {
    fn new() -> Self {
        Tables {
            column_families: COLUMN_FAMILIES
                .iter()
                .map(|name| (*name, Table::new()))
                .collect(),
        }
    }

    fn cf(&self, name: &str) -> &Table {
        self.column_families.get(name).expect(CF_ERROR)
    }

    fn cf_mut(&mut self, name: &str) -> &mut Table {
        self.column_families.get_mut(name).expect(CF_ERROR)
    }
}

/// Pending writes of a transaction, `None` being a deletion
type WriteBatch = BTreeMap<(&'static str, Vec<u8>), Option<Vec<u8>>>;

/// Raw access to the column families, shared by readers and writers
trait RawView {
    fn get(&self, cf: &'static str, key: &[u8]) -> Option<Vec<u8>>;

    /// Every entry of `cf` whose key starts with `prefix`, in key order
    fn scan(&self, cf: &'static str, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
}

fn scan_table(table: &Table, prefix: &[u8]) -> Table {
    table
        .range(prefix.to_vec()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn representation_key(account: &Account) -> Vec<u8> {
    account.to_bytes().to_vec()
}

fn checksum_key(prefix: u64, mask: u8) -> Vec<u8> {
    let mut key = prefix.to_be_bytes().to_vec();
    key.push(mask);
    key
}

fn decode_hash(bytes: &[u8]) -> Hash {
    let array: [u8; HASH_SIZE_BYTES] = bytes.try_into().expect(KEY_DESER_ERROR);
    Hash::from_bytes(&array)
}

fn decode_account(bytes: &[u8]) -> Account {
    Account::from_bytes(decode_hash(bytes).to_bytes())
}

/// Typed lookups over the raw view of a transaction handle
macro_rules! impl_ledger_reader {
    ($handle:ident) => {
        impl<'a> LedgerReader for $handle<'a> {
            fn block_get(&self, hash: &BlockHash) -> Option<Block> {
                self.get(BLOCKS_CF, hash.to_bytes())
                    .map(|bytes| Block::from_bytes(&bytes).expect(BLOCK_DESER_ERROR))
            }

            fn block_exists(&self, hash: &BlockHash) -> bool {
                self.get(BLOCKS_CF, hash.to_bytes()).is_some()
            }

            fn block_info_get(&self, hash: &BlockHash) -> Option<BlockInfo> {
                self.get(BLOCK_INFO_CF, hash.to_bytes())
                    .map(|bytes| BlockInfo::from_bytes(&bytes).expect(BLOCK_INFO_DESER_ERROR))
            }

            fn account_get(&self, account: &Account) -> Option<AccountInfo> {
                self.get(ACCOUNTS_CF, account.to_bytes())
                    .map(|bytes| AccountInfo::from_bytes(&bytes).expect(ACCOUNT_INFO_DESER_ERROR))
            }

            fn pending_get(&self, key: &PendingKey) -> Option<PendingInfo> {
                self.get(PENDING_CF, &key.to_bytes())
                    .map(|bytes| PendingInfo::from_bytes(&bytes).expect(PENDING_DESER_ERROR))
            }

            fn pending_of(&self, account: &Account) -> Vec<(PendingKey, PendingInfo)> {
                self.scan(PENDING_CF, account.to_bytes())
                    .into_iter()
                    .map(|(key, value)| {
                        (
                            PendingKey::from_bytes(&key).expect(KEY_DESER_ERROR),
                            PendingInfo::from_bytes(&value).expect(PENDING_DESER_ERROR),
                        )
                    })
                    .collect()
            }

            fn representation_get(&self, account: &Account) -> Amount {
                self.get(REPRESENTATION_CF, &representation_key(account))
                    .map(|bytes| {
                        let raw: [u8; 16] = bytes.as_slice().try_into().expect(AMOUNT_DESER_ERROR);
                        Amount::from_raw(u128::from_be_bytes(raw))
                    })
                    .unwrap_or_default()
            }

            fn frontier_get(&self, hash: &BlockHash) -> Option<Account> {
                self.get(FRONTIERS_CF, hash.to_bytes())
                    .map(|bytes| decode_account(&bytes))
            }

            fn checksum_get(&self, prefix: u64, mask: u8) -> Option<BlockHash> {
                self.get(CHECKSUM_CF, &checksum_key(prefix, mask))
                    .map(|bytes| decode_hash(&bytes))
            }

            fn latest_begin(&self) -> Box<dyn Iterator<Item = (Account, AccountInfo)> + '_> {
                Box::new(self.scan(ACCOUNTS_CF, &[]).into_iter().map(|(key, value)| {
                    (
                        decode_account(&key),
                        AccountInfo::from_bytes(&value).expect(ACCOUNT_INFO_DESER_ERROR),
                    )
                }))
            }
        }
    };
}

/// In-memory lattice store
///
/// Contains one ordered byte table per column family behind a single lock
pub struct MemoryLedgerDB {
    tables: RwLock<Tables>,
}

impl Debug for MemoryLedgerDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_map()
            .entries(
                tables
                    .column_families
                    .iter()
                    .map(|(name, table)| (name, table.len())),
            )
            .finish()
    }
}

impl Default for MemoryLedgerDB {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerDB {
    /// Creates an empty store
    pub fn new() -> Self {
        MemoryLedgerDB {
            tables: RwLock::new(Tables::new()),
        }
    }
}

/// Read transaction over a `MemoryLedgerDB`
pub struct MemoryReader<'a> {
    tables: RwLockReadGuard<'a, Tables>,
}

impl<'a> RawView for MemoryReader<'a> {
    fn get(&self, cf: &'static str, key: &[u8]) -> Option<Vec<u8>> {
        self.tables.cf(cf).get(key).cloned()
    }

    fn scan(&self, cf: &'static str, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        scan_table(self.tables.cf(cf), prefix).into_iter().collect()
    }
}

/// Read-write transaction over a `MemoryLedgerDB`.
///
/// Holds the upgradable lock, so readers keep running while the batch is
/// built, and only the commit excludes them.
pub struct MemoryWriter<'a> {
    tables: RwLockUpgradableReadGuard<'a, Tables>,
    batch: WriteBatch,
}

impl<'a> MemoryWriter<'a> {
    fn put(&mut self, cf: &'static str, key: Vec<u8>, value: Vec<u8>) {
        self.batch.insert((cf, key), Some(value));
    }

    fn delete(&mut self, cf: &'static str, key: Vec<u8>) {
        self.batch.insert((cf, key), None);
    }
}

impl<'a> RawView for MemoryWriter<'a> {
    fn get(&self, cf: &'static str, key: &[u8]) -> Option<Vec<u8>> {
        match self.batch.get(&(cf, key.to_vec())) {
            Some(change) => change.clone(),
            None => self.tables.cf(cf).get(key).cloned(),
        }
    }

    fn scan(&self, cf: &'static str, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut entries = scan_table(self.tables.cf(cf), prefix);
        for ((change_cf, key), change) in self.batch.range((cf, prefix.to_vec())..) {
            if *change_cf != cf || !key.starts_with(prefix) {
                break;
            }
            match change {
                Some(value) => entries.insert(key.clone(), value.clone()),
                None => entries.remove(key),
            };
        }
        entries.into_iter().collect()
    }
}

impl_ledger_reader!(MemoryReader);
impl_ledger_reader!(MemoryWriter);

impl<'a> LedgerWriter for MemoryWriter<'a> {
    fn block_put(&mut self, hash: &BlockHash, block: &Block) {
        self.put(BLOCKS_CF, hash.to_bytes().to_vec(), block.to_bytes());
    }

    fn block_info_put(&mut self, hash: &BlockHash, info: &BlockInfo) {
        self.put(BLOCK_INFO_CF, hash.to_bytes().to_vec(), info.to_bytes());
    }

    fn account_put(&mut self, account: &Account, info: &AccountInfo) {
        self.put(ACCOUNTS_CF, account.to_bytes().to_vec(), info.to_bytes());
    }

    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo) {
        self.put(PENDING_CF, key.to_bytes(), info.to_bytes());
    }

    fn pending_del(&mut self, key: &PendingKey) {
        self.delete(PENDING_CF, key.to_bytes());
    }

    fn representation_put(&mut self, account: &Account, weight: Amount) {
        self.put(
            REPRESENTATION_CF,
            representation_key(account),
            weight.to_raw().to_be_bytes().to_vec(),
        );
    }

    fn checksum_put(&mut self, prefix: u64, mask: u8, hash: &BlockHash) {
        self.put(
            CHECKSUM_CF,
            checksum_key(prefix, mask),
            hash.to_bytes().to_vec(),
        );
    }

    fn frontier_put(&mut self, hash: &BlockHash, account: &Account) {
        self.put(
            FRONTIERS_CF,
            hash.to_bytes().to_vec(),
            account.to_bytes().to_vec(),
        );
    }

    fn frontier_del(&mut self, hash: &BlockHash) {
        self.delete(FRONTIERS_CF, hash.to_bytes().to_vec());
    }

    fn commit(self) {
        let MemoryWriter { tables, batch } = self;
        let mut tables = RwLockUpgradableReadGuard::upgrade(tables);
        for ((cf, key), change) in batch {
            let table = tables.cf_mut(cf);
            match change {
                Some(value) => table.insert(key, value),
                None => table.remove(&key),
            };
        }
    }
}

impl LedgerStore for MemoryLedgerDB {
    type Reader<'a> = MemoryReader<'a> where Self: 'a;
    type Writer<'a> = MemoryWriter<'a> where Self: 'a;

    fn begin_read(&self) -> MemoryReader<'_> {
        MemoryReader {
            tables: self.tables.read(),
        }
    }

    fn begin_write(&self) -> MemoryWriter<'_> {
        MemoryWriter {
            tables: self.tables.upgradable_read(),
            batch: WriteBatch::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_models::block::ChangeBlock;
    use lattice_signature::KeyPair;

    fn sample_block() -> Block {
        Block::Change(ChangeBlock::new(
            Hash::compute_from(b"previous"),
            Account::BURN,
            &KeyPair::generate(),
            1,
        ))
    }

    #[test]
    fn test_commit_publishes_batch() {
        let db = MemoryLedgerDB::new();
        let block = sample_block();
        let hash = block.hash();
        {
            let mut writer = db.begin_write();
            writer.block_put(&hash, &block);
            assert_eq!(writer.block_get(&hash), Some(block.clone()));
            assert!(!db.begin_read().block_exists(&hash));
            writer.commit();
        }
        assert_eq!(db.begin_read().block_get(&hash), Some(block));
    }

    #[test]
    fn test_drop_discards_batch() {
        let db = MemoryLedgerDB::new();
        {
            let mut writer = db.begin_write();
            writer.representation_put(&Account::BURN, Amount::from_raw(10));
            writer.checksum_put(0, 0, &Hash::compute_from(b"checksum"));
        }
        let reader = db.begin_read();
        assert_eq!(reader.representation_get(&Account::BURN), Amount::zero());
        assert_eq!(reader.checksum_get(0, 0), None);
    }

    #[test]
    fn test_pending_scan_merges_batch() {
        let db = MemoryLedgerDB::new();
        let owner = Account::from_bytes(&[1u8; 32]);
        let other = Account::from_bytes(&[2u8; 32]);
        let key = |account: Account, seed: &[u8]| PendingKey {
            account,
            hash: Hash::compute_from(seed),
        };
        let info = PendingInfo {
            source: Account::BURN,
            amount: Amount::from_raw(3),
        };
        {
            let mut writer = db.begin_write();
            writer.pending_put(&key(owner, b"a"), &info);
            writer.pending_put(&key(owner, b"b"), &info);
            writer.pending_put(&key(other, b"c"), &info);
            writer.commit();
        }
        let mut writer = db.begin_write();
        writer.pending_del(&key(owner, b"a"));
        writer.pending_put(&key(owner, b"d"), &info);
        let pending = writer.pending_of(&owner);
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|(k, _)| k.account == owner));
        assert!(pending.iter().all(|(k, _)| k.hash != Hash::compute_from(b"a")));
        assert_eq!(db.begin_read().pending_of(&owner).len(), 2);
        assert_eq!(writer.pending_get(&key(owner, b"a")), None);
    }

    #[test]
    fn test_latest_begin_in_account_order() {
        let db = MemoryLedgerDB::new();
        assert!(db.begin_read().latest_begin().next().is_none());
        let mut writer = db.begin_write();
        for seed in [9u8, 3, 5] {
            writer.account_put(&Account::from_bytes(&[seed; 32]), &AccountInfo::default());
        }
        let accounts: Vec<Account> = writer.latest_begin().map(|(account, _)| account).collect();
        assert_eq!(
            accounts,
            vec![
                Account::from_bytes(&[3u8; 32]),
                Account::from_bytes(&[5u8; 32]),
                Account::from_bytes(&[9u8; 32]),
            ]
        );
        writer.frontier_put(&Hash::zero(), &accounts[0]);
        assert_eq!(writer.frontier_get(&Hash::zero()), Some(accounts[0]));
        writer.frontier_del(&Hash::zero());
        assert_eq!(writer.frontier_get(&Hash::zero()), None);
    }
}
