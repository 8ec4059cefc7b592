// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::account::Account;
use crate::block::BlockHash;
use crate::ModelsError;
use lattice_hash::Hash;
use lattice_signature::{KeyPair, PublicKey, KEYPAIR_SIZE_BYTES};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Private key of the test network genesis account, public knowledge
pub const TEST_GENESIS_PRIVATE_KEY: &str =
    "5F6C2316A2D3208C752DDF8D154C6F0401E948129BC1B7AB3F146417F064E18C";

const TEST_GENESIS_PUBLIC_KEY: &str =
    "D8887825DA4FC783B35B4C0A28984447813CE7628D8214174453A717C393B3F5";
const BETA_GENESIS_PUBLIC_KEY: &str =
    "1EA1F354847B9FABBD1EF16D95797D14C308185EC407D48F5CE93CE39C61A210";
const LIVE_GENESIS_PUBLIC_KEY: &str =
    "496DF07DCDEA2C29E8CF1B403D7F5C542863C052C24EFD8B7AF3A9B15E76E6A5";

const TEST_GENESIS_BLOCK: &str = r#"{
    "type": "open",
    "source": "D8887825DA4FC783B35B4C0A28984447813CE7628D8214174453A717C393B3F5",
    "representative": "ban_3p6ah1kxnmy9igsopm1c74e6ajw39mmp75e44idnanx94z3s9ezogicooigw",
    "account": "ban_3p6ah1kxnmy9igsopm1c74e6ajw39mmp75e44idnanx94z3s9ezogicooigw",
    "work": "9680625b39d3363d",
    "signature": "ECDA914373A2F0CA1296475BAEE40500A7F0A7AD72A5A80C81D7FAB7F6C802B2CC7DB50F5DD0FB25B2EF11761FA7344A158DD5A700B21BD47DE5BD0F63153A02"
}"#;

const BETA_GENESIS_BLOCK: &str = r#"{
    "type": "open",
    "source": "1EA1F354847B9FABBD1EF16D95797D14C308185EC407D48F5CE93CE39C61A210",
    "representative": "ban_19o3yfcaaywzogyjxwdfkowqt78531e7xj19tk9ostbwwgg85aiiz6t9xx9h",
    "account": "ban_19o3yfcaaywzogyjxwdfkowqt78531e7xj19tk9ostbwwgg85aiiz6t9xx9h",
    "work": "6eb12d4c42dba31e",
    "signature": "BD0D374FCEB33EAABDF728E9B4DCDBF3B226DA97EEAB8EA5B7EDE286B1282C24D6EB544644FE871235E4F58CD94DF66D9C555309895F67A7D1F922AAC12CE907"
}"#;

const LIVE_GENESIS_BLOCK: &str = r#"{
    "type": "open",
    "source": "496DF07DCDEA2C29E8CF1B403D7F5C542863C052C24EFD8B7AF3A9B15E76E6A5",
    "representative": "ban_1kdfy3ywutje79ney8t19ozoro3aeh177ikgzp7qowxbp7h9fso76xefe9gb",
    "account": "ban_1kdfy3ywutje79ney8t19ozoro3aeh177ikgzp7qowxbp7h9fso76xefe9gb",
    "work": "62f05417dd3fb691",
    "signature": "9F0C933C8ADE004D808EA1985FA746A7E95BA2A38F867640F53EC8F180BDFE9E2C1268DEAD7C2664F356E37ABA362BC58E46DBA03E523A7B5A19E4B6EB12BB02"
}"#;

lazy_static! {
    static ref TEST_GENESIS_ACCOUNT: Account = genesis_account(TEST_GENESIS_PUBLIC_KEY);
    static ref BETA_GENESIS_ACCOUNT: Account = genesis_account(BETA_GENESIS_PUBLIC_KEY);
    static ref LIVE_GENESIS_ACCOUNT: Account = genesis_account(LIVE_GENESIS_PUBLIC_KEY);

    /// Block hash sentinel, random per process so that no two nodes share it
    pub static ref NOT_A_BLOCK: BlockHash = Hash::from_bytes(&rand::random());
    /// Account sentinel, random per process so that no two nodes share it
    pub static ref NOT_AN_ACCOUNT: Account = Account::from_bytes(&rand::random());
}

fn genesis_account(public_key: &str) -> Account {
    Account::from_public_key(
        PublicKey::from_str(public_key).expect("critical: invalid genesis public key"),
    )
}

/// Network variant, which selects the genesis block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// local tests, the genesis private key is known
    Test,
    /// public beta
    Beta,
    /// production
    #[default]
    Live,
}

impl Network {
    /// Account opened by the genesis block
    pub fn genesis_account(&self) -> Account {
        match self {
            Network::Test => *TEST_GENESIS_ACCOUNT,
            Network::Beta => *BETA_GENESIS_ACCOUNT,
            Network::Live => *LIVE_GENESIS_ACCOUNT,
        }
    }

    /// Json document of the genesis open block
    pub fn genesis_block_json(&self) -> &'static str {
        match self {
            Network::Test => TEST_GENESIS_BLOCK,
            Network::Beta => BETA_GENESIS_BLOCK,
            Network::Live => LIVE_GENESIS_BLOCK,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Test => write!(f, "test"),
            Network::Beta => write!(f, "beta"),
            Network::Live => write!(f, "live"),
        }
    }
}

impl FromStr for Network {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Network::Test),
            "beta" => Ok(Network::Beta),
            "live" => Ok(Network::Live),
            other => Err(ModelsError::NetworkParseError(other.to_string())),
        }
    }
}

/// Key pair owning the test network genesis account
pub fn test_genesis_keypair() -> Result<KeyPair, ModelsError> {
    Ok(KeyPair::from_str(TEST_GENESIS_PRIVATE_KEY)?)
}

/// Key pair of the all-zero private key
pub fn zero_key() -> KeyPair {
    KeyPair::from_bytes(&[0u8; KEYPAIR_SIZE_BYTES])
}
