// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::genesis::{initialize, seconds_since_epoch};
use crate::ledger_db::MemoryLedgerDB;
use lattice_ledger_exports::{LedgerReader, LedgerStore, LedgerWriter};
use lattice_models::{
    account::Account,
    account_info::AccountInfo,
    amount::Amount,
    block::{Block, BlockHash, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock},
    block_info::BlockInfo,
    genesis::Genesis,
    network::{test_genesis_keypair, Network},
    pending::{PendingInfo, PendingKey},
};
use lattice_signature::KeyPair;
use std::collections::HashMap;

/// Appends blocks to a test network lattice, keeping every record consistent:
/// account infos, receivables, representative weights and frontiers.
///
/// Panics on any inconsistent request, it is only meant for tests.
pub struct ChainBuilder<'a> {
    db: &'a MemoryLedgerDB,
    genesis: Genesis,
    keys: HashMap<Account, KeyPair>,
    /// record a balance snapshot for every new block
    snapshots: bool,
}

impl<'a> ChainBuilder<'a> {
    /// Seeds `db` with the test genesis if it is empty
    pub fn new(db: &'a MemoryLedgerDB) -> Self {
        let genesis = Genesis::new(Network::Test).expect("test genesis");
        {
            let mut writer = db.begin_write();
            if writer.latest_begin().next().is_none() {
                initialize(&mut writer, &genesis).expect("genesis seeding");
                writer.commit();
            }
        }
        let keypair = test_genesis_keypair().expect("test genesis key");
        let mut keys = HashMap::new();
        keys.insert(genesis.account(), keypair);
        ChainBuilder {
            db,
            genesis,
            keys,
            snapshots: false,
        }
    }

    /// Also records a `BlockInfo` for every block added from now on
    pub fn with_snapshots(mut self) -> Self {
        self.snapshots = true;
        self
    }

    /// The test genesis
    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// The genesis account
    pub fn genesis_account(&self) -> Account {
        self.genesis.account()
    }

    /// A fresh account with a known key, not opened yet
    pub fn new_account(&mut self) -> Account {
        let keypair = KeyPair::generate();
        let account = Account::from_public_key(keypair.get_public_key());
        self.keys.insert(account, keypair);
        account
    }

    fn key(&self, account: &Account) -> &KeyPair {
        self.keys.get(account).expect("unknown account key")
    }

    fn info(&self, account: &Account) -> AccountInfo {
        self.db
            .begin_read()
            .account_get(account)
            .expect("account is not opened")
    }

    fn representative_of<R: LedgerReader>(reader: &R, info: &AccountInfo) -> Account {
        reader
            .block_get(&info.rep_block)
            .and_then(|block| block.representative())
            .expect("rep block sets a representative")
    }

    fn move_weight<W: LedgerWriter>(writer: &mut W, from: Option<Account>, to: Option<Account>, amount: Amount) {
        if let Some(from) = from {
            let weight = writer.representation_get(&from);
            writer.representation_put(&from, weight.checked_sub(amount).expect("weight underflow"));
        }
        if let Some(to) = to {
            let weight = writer.representation_get(&to);
            writer.representation_put(&to, weight.checked_add(amount).expect("weight overflow"));
        }
    }

    fn append<W: LedgerWriter>(
        &self,
        writer: &mut W,
        account: &Account,
        block: &Block,
        previous: Option<AccountInfo>,
        balance: Amount,
        rep_block: Option<BlockHash>,
    ) -> BlockHash {
        let hash = block.hash();
        writer.block_put(&hash, block);
        let info = match previous {
            Some(previous) => {
                writer.frontier_del(&previous.head);
                AccountInfo {
                    head: hash,
                    rep_block: rep_block.unwrap_or(previous.rep_block),
                    open_block: previous.open_block,
                    balance,
                    modified: seconds_since_epoch(),
                    block_count: previous.block_count + 1,
                }
            }
            None => AccountInfo {
                head: hash,
                rep_block: hash,
                open_block: hash,
                balance,
                modified: seconds_since_epoch(),
                block_count: 1,
            },
        };
        writer.account_put(account, &info);
        writer.frontier_put(&hash, account);
        if self.snapshots {
            writer.block_info_put(
                &hash,
                &BlockInfo {
                    account: *account,
                    balance,
                },
            );
        }
        hash
    }

    /// Sends `amount` from `from` to `to`
    pub fn send(&mut self, from: &Account, to: &Account, amount: Amount) -> BlockHash {
        let info = self.info(from);
        let balance = info.balance.checked_sub(amount).expect("insufficient balance");
        let block = Block::Send(SendBlock::new(info.head, *to, balance, self.key(from), 0));
        let mut writer = self.db.begin_write();
        let representative = Self::representative_of(&writer, &info);
        let hash = self.append(&mut writer, from, &block, Some(info), balance, None);
        writer.pending_put(
            &PendingKey {
                account: *to,
                hash,
            },
            &PendingInfo {
                source: *from,
                amount,
            },
        );
        Self::move_weight(&mut writer, Some(representative), None, amount);
        writer.commit();
        hash
    }

    fn take_pending<W: LedgerWriter>(writer: &mut W, account: &Account, source: &BlockHash) -> Amount {
        let key = PendingKey {
            account: *account,
            hash: *source,
        };
        let pending = writer.pending_get(&key).expect("no such receivable");
        writer.pending_del(&key);
        pending.amount
    }

    /// Opens `account` by pocketing the send `source`
    pub fn open(&mut self, account: &Account, source: &BlockHash, representative: &Account) -> BlockHash {
        let block = Block::Open(OpenBlock::new(
            *source,
            *representative,
            *account,
            self.key(account),
            0,
        ));
        let mut writer = self.db.begin_write();
        assert!(writer.account_get(account).is_none(), "account already opened");
        let amount = Self::take_pending(&mut writer, account, source);
        let hash = self.append(&mut writer, account, &block, None, amount, None);
        Self::move_weight(&mut writer, None, Some(*representative), amount);
        writer.commit();
        hash
    }

    /// Pockets the send `source` into the existing chain of `account`
    pub fn receive(&mut self, account: &Account, source: &BlockHash) -> BlockHash {
        let info = self.info(account);
        let block = Block::Receive(ReceiveBlock::new(info.head, *source, self.key(account), 0));
        let mut writer = self.db.begin_write();
        let amount = Self::take_pending(&mut writer, account, source);
        let representative = Self::representative_of(&writer, &info);
        let balance = info.balance.checked_add(amount).expect("balance overflow");
        let hash = self.append(&mut writer, account, &block, Some(info), balance, None);
        Self::move_weight(&mut writer, None, Some(representative), amount);
        writer.commit();
        hash
    }

    /// Switches the representative of `account`
    pub fn change(&mut self, account: &Account, representative: &Account) -> BlockHash {
        let info = self.info(account);
        let block = Block::Change(ChangeBlock::new(info.head, *representative, self.key(account), 0));
        let hash = block.hash();
        let mut writer = self.db.begin_write();
        let previous_representative = Self::representative_of(&writer, &info);
        let balance = info.balance;
        self.append(&mut writer, account, &block, Some(info), balance, Some(hash));
        Self::move_weight(
            &mut writer,
            Some(previous_representative),
            Some(*representative),
            balance,
        );
        writer.commit();
        hash
    }
}
