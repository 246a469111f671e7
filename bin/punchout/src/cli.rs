use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::Parser;
use punchout_deploy::{DeploymentConfig, Preset};
use tracing::level_filters::LevelFilter;

/// How the final report is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    /// One line for the address, then one per token URI and boss attack.
    #[default]
    Plain,
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "punchout")]
#[command(
    author,
    version,
    about = "Deploy the Punch-Out NFT game contract, mint its fighters and fight the boss"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "PUNCHOUT_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Built-in parameter table to start from.
    ///
    /// `run` mints the whole roster, `deploy` mints the first four characters, `boss` adds a
    /// boss, mints one character and attacks the boss twice.
    #[arg(long, env = "PUNCHOUT_PRESET", default_value_t = Preset::Run)]
    pub preset: Preset,

    /// Path to a Punchout.toml configuration file (or a directory containing one),
    /// layered over the preset.
    #[arg(long, alias = "conf", env = "PUNCHOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The URL of the JSON-RPC endpoint.
    #[arg(long, alias = "rpc", env = "PUNCHOUT_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Address sending every transaction. It must be unlocked on the node.
    ///
    /// If not provided, the first account returned by `eth_accounts` is used.
    #[arg(long, env = "PUNCHOUT_FROM")]
    pub from: Option<Address>,

    /// The Hardhat artifacts directory.
    #[arg(long, env = "PUNCHOUT_ARTIFACTS")]
    pub artifacts: Option<PathBuf>,

    /// The name of the contract to deploy.
    #[arg(long, env = "PUNCHOUT_CONTRACT")]
    pub contract: Option<String>,

    /// The number of characters to mint, starting at index 0.
    #[arg(long, alias = "mint", env = "PUNCHOUT_MINT_COUNT")]
    pub mint_count: Option<usize>,

    /// Timeout in seconds for every chain call. Waits indefinitely if not provided.
    #[arg(long, env = "PUNCHOUT_CALL_TIMEOUT_SECS")]
    pub call_timeout_secs: Option<u64>,

    /// Deploy without a boss, even if the preset or config file defines one.
    #[arg(long, env = "PUNCHOUT_NO_BOSS")]
    pub no_boss: bool,

    /// Write the effective configuration to this path and exit without deploying.
    #[arg(long, env = "PUNCHOUT_SAVE_CONFIG")]
    pub save_config: Option<PathBuf>,

    /// The output format of the final report.
    #[arg(long, env = "PUNCHOUT_FORMAT", default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

impl Cli {
    /// Apply explicit command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut DeploymentConfig) {
        if let Some(rpc_url) = &self.rpc_url {
            config.chain.rpc_url = rpc_url.clone();
        }
        if let Some(from) = self.from {
            config.chain.from = Some(from);
        }
        if let Some(artifacts) = &self.artifacts {
            config.artifacts = artifacts.clone();
        }
        if let Some(contract) = &self.contract {
            config.contract = contract.clone();
        }
        if let Some(mint_count) = self.mint_count {
            config.mint_count = Some(mint_count);
        }
        if let Some(secs) = self.call_timeout_secs {
            config.call_timeout_secs = Some(secs);
        }
        if self.no_boss {
            config.boss = None;
        }
    }
}
