//! punchout-deploy - Deployment library for the Punch-Out NFT game contract.
//!
//! This crate deploys the game contract to an EVM chain, mints its characters in order and
//! optionally fights the boss, reporting every token URI along the way.

mod chain;
pub use chain::{ChainClient, PendingTransaction, TransactionReceipt};

mod config;
pub use config::{
    CONFIG_FILENAME, ChainSettings, DEFAULT_ARTIFACTS_DIR, DEFAULT_CONTRACT_NAME,
    DEFAULT_RPC_URL, DeploymentConfig, ENV_PREFIX, MAX_BOSS_ATTACKS, Preset,
};

mod contract;
pub use contract::{ContractFactory, INftGame, NftGame, encode_constructor_args};

mod metadata;
pub use metadata::{TokenAttribute, TokenMetadata};

mod orchestrator;
pub use orchestrator::{Orchestrator, RunState, run_deployment};

mod report;
pub use report::{BossAttackOutcome, DeploymentReport, MintedToken};

mod roster;
pub use roster::{BossRecord, Character, CharacterRoster, RosterColumns};

pub mod rpc;
pub use rpc::JsonRpcChain;
