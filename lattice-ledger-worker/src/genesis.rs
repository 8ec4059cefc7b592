// Copyright (c) 2022 MASSA LABS <info@massa.net>

use lattice_ledger_exports::{LedgerError, LedgerWriter};
use lattice_logging::lattice_trace;
use lattice_models::{account_info::AccountInfo, genesis::Genesis};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Seconds elapsed since the unix epoch, zero for a clock set before it
pub(crate) fn seconds_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Seeds an empty ledger with the genesis block of `genesis`.
///
/// Every write goes through `writer`, the caller commits it.
///
/// # Errors
/// `NotEmpty` if the ledger already has an account. Seeding twice is a
/// programming error, nothing is written in that case.
pub fn initialize<W: LedgerWriter + ?Sized>(
    writer: &mut W,
    genesis: &Genesis,
) -> Result<(), LedgerError> {
    if writer.latest_begin().next().is_some() {
        return Err(LedgerError::NotEmpty);
    }
    let hash = genesis.hash();
    let account = genesis.account();
    writer.block_put(&hash, &genesis.block());
    writer.account_put(
        &account,
        &AccountInfo {
            head: hash,
            rep_block: hash,
            open_block: hash,
            balance: genesis.amount(),
            modified: seconds_since_epoch(),
            block_count: 1,
        },
    );
    writer.representation_put(&account, genesis.amount());
    writer.checksum_put(0, 0, &hash);
    writer.frontier_put(&hash, &account);
    info!("ledger seeded with the {} genesis block {}", genesis.network(), hash);
    lattice_trace!("ledger.genesis.initialize", {
        "network": genesis.network().to_string(),
        "account": account.to_string(),
        "hash": hash.to_string()
    });
    Ok(())
}
