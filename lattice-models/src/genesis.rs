// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::account::Account;
use crate::amount::Amount;
use crate::block::{Block, BlockHash, OpenBlock};
use crate::network::Network;
use crate::ModelsError;

/// Supply held by the genesis account once the ledger is seeded
pub const GENESIS_AMOUNT: Amount = Amount::MAX;

/// Genesis open block of a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genesis {
    network: Network,
    open: OpenBlock,
}

impl Genesis {
    /// Parses the embedded genesis block of `network`
    pub fn new(network: Network) -> Result<Self, ModelsError> {
        let open = match Block::from_json(network.genesis_block_json())? {
            Block::Open(open) => open,
            other => {
                return Err(ModelsError::GenesisError(format!(
                    "{} genesis is a {:?} block",
                    network,
                    other.block_type()
                )))
            }
        };
        if open.hashables.account != network.genesis_account() {
            return Err(ModelsError::GenesisError(format!(
                "{} genesis opens {} instead of {}",
                network,
                open.hashables.account,
                network.genesis_account()
            )));
        }
        Ok(Genesis { network, open })
    }

    /// Network of the genesis
    pub fn network(&self) -> Network {
        self.network
    }

    /// The genesis account
    pub fn account(&self) -> Account {
        self.open.hashables.account
    }

    /// Hash of the genesis block
    pub fn hash(&self) -> BlockHash {
        self.open.hash()
    }

    /// The genesis open block
    pub fn open_block(&self) -> &OpenBlock {
        &self.open
    }

    /// The genesis block as a `Block`
    pub fn block(&self) -> Block {
        Block::Open(self.open.clone())
    }

    /// Amount credited by the genesis block
    pub fn amount(&self) -> Amount {
        GENESIS_AMOUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_genesis_keypair;

    #[test]
    fn test_genesis_blocks_parse() {
        for network in [Network::Test, Network::Beta, Network::Live] {
            let genesis = Genesis::new(network).unwrap();
            assert_eq!(genesis.account(), network.genesis_account());
            assert_eq!(genesis.open_block().hashables.representative, genesis.account());
            // the genesis source is the genesis key itself
            assert_eq!(genesis.open_block().hashables.source, genesis.account().to_hash());
            assert_eq!(genesis.block().root(), genesis.account().to_hash());
            assert_eq!(genesis.amount(), Amount::MAX);
        }
    }

    #[test]
    fn test_test_genesis_hash() {
        let genesis = Genesis::new(Network::Test).unwrap();
        assert_eq!(
            genesis.hash().to_hex(),
            "80B022D94AD15E5C3961256D3B2C085336109F0C2E52F1D3A2D85E0B7273F09A"
        );
    }

    #[test]
    fn test_test_genesis_is_reproducible() {
        let genesis = Genesis::new(Network::Test).unwrap();
        let keypair = test_genesis_keypair().unwrap();
        let open = genesis.open_block();
        let rebuilt = OpenBlock::new(
            open.hashables.source,
            open.hashables.representative,
            open.hashables.account,
            &keypair,
            open.work,
        );
        // the embedded signatures are kept as published, only the hashed
        // content is rebuilt
        assert_eq!(rebuilt.hashables, open.hashables);
        assert_eq!(rebuilt.work, open.work);
        assert_eq!(rebuilt.hash(), genesis.hash());
        assert!(genesis
            .account()
            .verify_signature(&rebuilt.hash(), &rebuilt.signature)
            .is_ok());
        assert_eq!(
            Block::from_json(&genesis.block().to_json().unwrap()).unwrap(),
            genesis.block()
        );
    }
}
