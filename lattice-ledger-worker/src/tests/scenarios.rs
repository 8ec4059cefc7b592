// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::test_exports::ChainBuilder;
use crate::{initialize, Ledger, MemoryLedgerDB};
use assert_matches::assert_matches;
use lattice_hash::Hash;
use lattice_ledger_exports::{LedgerConfig, LedgerError, LedgerReader, LedgerStore, LedgerWriter};
use lattice_models::{
    account::Account,
    amount::Amount,
    block::{Block, ReceiveBlock, SendBlock},
    genesis::Genesis,
    network::{Network, NOT_A_BLOCK},
};
use lattice_signature::KeyPair;
use serial_test::serial;
use std::sync::Arc;

fn raw(value: u128) -> Amount {
    Amount::from_raw(value)
}

fn test_ledger() -> (Arc<MemoryLedgerDB>, Ledger<Arc<MemoryLedgerDB>>) {
    let db = Arc::new(MemoryLedgerDB::new());
    let ledger = Ledger::new(
        LedgerConfig {
            network: Network::Test,
        },
        db.clone(),
    )
    .unwrap();
    (db, ledger)
}

#[test]
fn test_live_genesis_initialization() {
    let db = Arc::new(MemoryLedgerDB::new());
    let ledger = Ledger::new(LedgerConfig::default(), db.clone()).unwrap();
    let genesis = Genesis::new(Network::Live).unwrap();
    let account = Network::Live.genesis_account();
    assert_eq!(ledger.genesis(), &genesis);

    let reader = db.begin_read();
    let info = reader.account_get(&account).unwrap();
    assert_eq!(info.block_count, 1);
    assert_eq!(info.balance, Amount::MAX);
    assert_eq!(info.head, genesis.hash());
    assert_eq!(info.open_block, genesis.hash());
    assert_eq!(info.rep_block, genesis.hash());
    assert_eq!(reader.representation_get(&account), Amount::MAX);
    assert_eq!(reader.checksum_get(0, 0), Some(genesis.hash()));
    assert_eq!(reader.frontier_get(&genesis.hash()), Some(account));
    assert_eq!(reader.block_get(&genesis.hash()), Some(genesis.block()));
    assert_eq!(reader.latest_begin().count(), 1);
    drop(reader);

    assert_eq!(ledger.weight(&account), Amount::MAX);
    assert_eq!(ledger.balance(&genesis.hash()).unwrap(), Amount::MAX);
    assert_eq!(ledger.amount(&genesis.hash()).unwrap(), Amount::MAX);
}

#[test]
fn test_genesis_seeds_only_once() {
    let db = Arc::new(MemoryLedgerDB::new());
    let genesis = Genesis::new(Network::Beta).unwrap();
    let _ledger = Ledger::new(
        LedgerConfig {
            network: Network::Beta,
        },
        db.clone(),
    )
    .unwrap();

    let mut writer = db.begin_write();
    assert_matches!(
        initialize(&mut writer, &genesis),
        Err(LedgerError::NotEmpty)
    );
    drop(writer);

    // reopening a seeded store keeps its content
    let reopened = Ledger::new(
        LedgerConfig {
            network: Network::Beta,
        },
        db.clone(),
    )
    .unwrap();
    assert_eq!(reopened.latest(&genesis.account()), Some(genesis.hash()));
    assert_eq!(db.begin_read().latest_begin().count(), 1);
}

#[test]
fn test_genesis_account_quirk() {
    let (_db, ledger) = test_ledger();
    // not a block, but the genesis account read as a hash
    let genesis_source = ledger.genesis().account().to_hash();
    assert_eq!(ledger.amount(&genesis_source).unwrap(), Amount::MAX);
    let stranger = *NOT_A_BLOCK;
    assert_matches!(
        ledger.amount(&stranger),
        Err(LedgerError::MissingBlock(hash)) if hash == stranger
    );
}

fn check_balance_conservation(snapshots: bool) {
    let (db, ledger) = test_ledger();
    let mut builder = ChainBuilder::new(&db);
    if snapshots {
        builder = builder.with_snapshots();
    }
    let genesis = builder.genesis_account();
    let alice = builder.new_account();
    let bob = builder.new_account();

    let send_1 = builder.send(&genesis, &alice, raw(1_000));
    let alice_open = builder.open(&alice, &send_1, &alice);
    let send_2 = builder.send(&genesis, &alice, raw(500));
    let alice_receive = builder.receive(&alice, &send_2);
    let alice_send = builder.send(&alice, &bob, raw(300));
    let bob_open = builder.open(&bob, &alice_send, &bob);
    let alice_change = builder.change(&alice, &bob);

    assert_eq!(ledger.amount(&send_1).unwrap(), raw(1_000));
    assert_eq!(ledger.amount(&alice_open).unwrap(), raw(1_000));
    assert_eq!(ledger.amount(&send_2).unwrap(), raw(500));
    assert_eq!(ledger.amount(&alice_receive).unwrap(), raw(500));
    assert_eq!(ledger.amount(&alice_send).unwrap(), raw(300));
    assert_eq!(ledger.amount(&bob_open).unwrap(), raw(300));
    assert_eq!(ledger.amount(&alice_change).unwrap(), Amount::zero());

    // received minus sent, at every block of the chain
    assert_eq!(ledger.balance(&alice_open).unwrap(), raw(1_000));
    assert_eq!(ledger.balance(&alice_receive).unwrap(), raw(1_500));
    assert_eq!(ledger.balance(&alice_send).unwrap(), raw(1_200));
    assert_eq!(ledger.balance(&alice_change).unwrap(), raw(1_200));
    assert_eq!(ledger.balance(&bob_open).unwrap(), raw(300));
    assert_eq!(
        ledger.balance(&send_2).unwrap(),
        Amount::MAX.checked_sub(raw(1_500)).unwrap()
    );

    for account in [genesis, alice, bob] {
        let head = ledger.latest(&account).unwrap();
        assert_eq!(ledger.balance(&head).unwrap(), ledger.account_balance(&account));
    }

    // weights follow the representatives and still add up to the supply
    assert_eq!(ledger.weight(&alice), Amount::zero());
    assert_eq!(ledger.weight(&bob), raw(1_500));
    assert_eq!(
        ledger
            .weight(&genesis)
            .checked_add(ledger.weight(&bob))
            .unwrap(),
        Amount::MAX
    );
}

#[test]
fn test_balance_conservation() {
    check_balance_conservation(false);
}

#[test]
fn test_balance_conservation_with_snapshots() {
    check_balance_conservation(true);
}

#[test]
fn test_send_amount_is_balance_drop() {
    let (db, ledger) = test_ledger();
    let mut builder = ChainBuilder::new(&db);
    let genesis = builder.genesis_account();
    let alice = builder.new_account();
    let send = builder.send(&genesis, &alice, raw(42));
    builder.open(&alice, &send, &genesis);
    let alice_send = builder.send(&alice, &genesis, raw(40));

    let block = db.begin_read().block_get(&alice_send).unwrap();
    let Block::Send(send_block) = &block else {
        panic!("expected a send block");
    };
    let previous_balance = ledger.balance(&send_block.hashables.previous).unwrap();
    assert_eq!(
        ledger.amount(&alice_send).unwrap(),
        previous_balance
            .checked_sub(send_block.hashables.balance)
            .unwrap()
    );
    assert_eq!(send_block.hashables.balance, raw(2));
}

#[test]
fn test_representative_stability() {
    let (db, ledger) = test_ledger();
    let mut builder = ChainBuilder::new(&db);
    let genesis = builder.genesis_account();
    let alice = builder.new_account();
    let first_rep = builder.new_account();
    let second_rep = builder.new_account();

    let send = builder.send(&genesis, &alice, raw(100));
    let open = builder.open(&alice, &send, &alice);
    assert_eq!(ledger.representative(&open).unwrap(), open);
    let plain_send = builder.send(&alice, &genesis, raw(1));
    assert_eq!(ledger.representative(&plain_send).unwrap(), open);

    builder.change(&alice, &first_rep);
    builder.send(&alice, &genesis, raw(1));
    builder.send(&alice, &genesis, raw(1));
    let last_change = builder.change(&alice, &second_rep);
    let head = ledger.latest(&alice).unwrap();
    assert_eq!(head, last_change);

    let rep_block = ledger.representative(&head).unwrap();
    assert_eq!(rep_block, last_change);
    let block = db.begin_read().block_get(&rep_block).unwrap();
    assert_eq!(block.representative(), Some(second_rep));
    assert_eq!(ledger.weight(&second_rep), raw(97));
    assert_eq!(ledger.weight(&first_rep), Amount::zero());
}

#[test]
fn test_pending_and_counts() {
    let (db, ledger) = test_ledger();
    let mut builder = ChainBuilder::new(&db);
    let genesis = builder.genesis_account();
    let alice = builder.new_account();
    let send = builder.send(&genesis, &alice, raw(7));

    let pending = ledger.pending(&alice);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].0.hash, send);
    assert_eq!(pending[0].1.source, genesis);
    assert_eq!(pending[0].1.amount, raw(7));

    builder.open(&alice, &send, &alice);
    assert!(ledger.pending(&alice).is_empty());

    let counts = ledger.chain_counts(&genesis).unwrap();
    assert_eq!((counts.open, counts.send, counts.sum()), (1, 1, 2));
    let counts = ledger.chain_counts(&alice).unwrap();
    assert_eq!((counts.open, counts.sum()), (1, 1));
    assert_eq!(
        ledger.chain_counts(&Account::BURN).unwrap().sum(),
        0
    );
}

#[test]
fn test_long_chain_walk() {
    let (db, ledger) = test_ledger();
    let mut builder = ChainBuilder::new(&db);
    let genesis = builder.genesis_account();
    let alice = builder.new_account();
    let first = builder.send(&genesis, &alice, raw(1));
    builder.open(&alice, &first, &alice);
    for _ in 0..2_000 {
        let send = builder.send(&genesis, &alice, raw(1));
        builder.receive(&alice, &send);
    }
    let head = ledger.latest(&alice).unwrap();
    assert_eq!(ledger.balance(&head).unwrap(), raw(2_001));
    assert_eq!(ledger.representative(&head).unwrap(), db.begin_read().account_get(&alice).unwrap().open_block);
}

#[test]
fn test_missing_source_is_reported() {
    let (db, ledger) = test_ledger();
    let keypair = KeyPair::generate();
    let ghost_source = Hash::compute_from(b"ghost send");
    let block = Block::Receive(ReceiveBlock::new(
        ledger.genesis().hash(),
        ghost_source,
        &keypair,
        0,
    ));
    let hash = block.hash();
    let mut writer = db.begin_write();
    writer.block_put(&hash, &block);
    writer.commit();

    assert_matches!(
        ledger.balance(&hash),
        Err(LedgerError::MissingBlock(missing)) if missing == ghost_source
    );
    assert_matches!(
        ledger.amount(&hash),
        Err(LedgerError::MissingBlock(missing)) if missing == ghost_source
    );
    // the representative walk does not need the source
    assert_eq!(ledger.representative(&hash).unwrap(), ledger.genesis().hash());
}

#[test]
fn test_send_raising_balance_overflows_amount() {
    let (db, ledger) = test_ledger();
    let keypair = KeyPair::generate();
    let first = Block::Send(SendBlock::new(
        ledger.genesis().hash(),
        Account::BURN,
        raw(5),
        &keypair,
        0,
    ));
    let second = Block::Send(SendBlock::new(
        first.hash(),
        Account::BURN,
        raw(9),
        &keypair,
        0,
    ));
    let mut writer = db.begin_write();
    writer.block_put(&first.hash(), &first);
    writer.block_put(&second.hash(), &second);
    writer.commit();

    assert_matches!(ledger.amount(&second.hash()), Err(LedgerError::AmountOverflow));
    // the declared balance does not depend on the predecessor
    assert_eq!(ledger.balance(&second.hash()).unwrap(), raw(9));
    assert_eq!(
        ledger.amount(&first.hash()).unwrap(),
        Amount::MAX.checked_sub(raw(5)).unwrap()
    );
}

#[test]
#[serial]
fn test_open_reads_configured_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[ledger]\nnetwork = \"test\"\n").unwrap();
    std::env::set_var("LATTICE_CONFIG_PATH", &path);
    std::env::set_var("LATTICE_CONFIG_OVERRIDE_PATH", dir.path().join("absent.toml"));

    let ledger = Ledger::open(MemoryLedgerDB::new()).unwrap();
    assert_eq!(ledger.config().network, Network::Test);
    assert_eq!(ledger.genesis(), &Genesis::new(Network::Test).unwrap());
    assert_eq!(
        ledger.account_balance(&Network::Test.genesis_account()),
        Amount::MAX
    );

    std::env::set_var("LATTICE_CONFIG_PATH", dir.path().join("absent.toml"));
    assert_matches!(
        Ledger::open(MemoryLedgerDB::new()),
        Err(LedgerError::ModelsError(_))
    );

    std::env::remove_var("LATTICE_CONFIG_PATH");
    std::env::remove_var("LATTICE_CONFIG_OVERRIDE_PATH");
}
