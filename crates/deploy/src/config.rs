//! Deployment configuration: built-in presets, TOML persistence, and layered loading.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{BossRecord, CharacterRoster};

/// The default name for the punchout configuration file.
pub const CONFIG_FILENAME: &str = "Punchout.toml";

/// Prefix of the environment variables layered over the configuration file.
pub const ENV_PREFIX: &str = "PUNCHOUT_";

/// The contract can be asked to fight its boss at most this many times per run.
pub const MAX_BOSS_ATTACKS: u8 = 2;

/// Default JSON-RPC endpoint (local Hardhat node / Anvil).
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default contract name.
pub const DEFAULT_CONTRACT_NAME: &str = "NftGame";

/// Default Hardhat artifacts directory.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Built-in parameter tables, one per historical deploy script.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Mint every character of the roster.
    #[default]
    Run,
    /// Mint the first four characters.
    Deploy,
    /// Deploy with a boss, mint one character and attack the boss twice.
    Boss,
}

/// How to reach the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSettings {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Sender of every transaction. Must be unlocked on the node. Defaults to the node's
    /// first account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Interval between two `eth_getTransactionReceipt` polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_boss_attacks() -> u8 {
    MAX_BOSS_ATTACKS
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            from: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ChainSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Everything a deployment run needs.
///
/// Serialized to/from TOML; scalar fields come first so the file stays valid TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Name of the contract to deploy, as found in the artifacts directory.
    pub contract: String,
    /// Hardhat artifacts directory.
    pub artifacts: PathBuf,
    /// Number of characters to mint, starting at index 0. The whole roster if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_count: Option<usize>,
    /// Number of boss attacks once minting is done. Ignored without a boss.
    #[serde(default = "default_boss_attacks")]
    pub boss_attacks: u8,
    /// Timeout applied to every awaited chain call. Waits indefinitely if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
    #[serde(default)]
    pub chain: ChainSettings,
    pub roster: CharacterRoster,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss: Option<BossRecord>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl DeploymentConfig {
    /// Configuration reproducing one of the built-in deploy scripts.
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            contract: DEFAULT_CONTRACT_NAME.to_string(),
            artifacts: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            mint_count: None,
            boss_attacks: MAX_BOSS_ATTACKS,
            call_timeout_secs: None,
            chain: ChainSettings::default(),
            roster: CharacterRoster::punch_out(),
            boss: None,
        };

        match preset {
            Preset::Run => base,
            Preset::Deploy => Self {
                mint_count: Some(4),
                ..base
            },
            Preset::Boss => Self {
                mint_count: Some(1),
                boss: Some(BossRecord::bald_bull()),
                ..base
            },
        }
    }

    /// Merge, from lowest to highest priority: the preset, the optional TOML file, and
    /// `PUNCHOUT_*` environment variables (nested keys separated by `__`).
    pub fn layered(preset: Preset, file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::preset(preset)));

        if let Some(path) = file {
            let path = resolve_config_path(path)?;
            figment = figment.merge(Toml::file_exact(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to load deployment configuration")
    }

    /// Number of characters the run mints.
    pub fn effective_mint_count(&self) -> usize {
        self.mint_count.unwrap_or(self.roster.len())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    /// Check every invariant before any chain call is made.
    pub fn validate(&self) -> Result<()> {
        if self.contract.trim().is_empty() {
            anyhow::bail!("Contract name is empty");
        }

        self.roster.validate().context("Invalid character roster")?;

        if let Some(boss) = &self.boss {
            boss.validate().context("Invalid boss record")?;
        }

        let mint_count = self.effective_mint_count();
        if mint_count > self.roster.len() {
            anyhow::bail!(
                "Cannot mint {} characters from a roster of {}",
                mint_count,
                self.roster.len()
            );
        }

        if self.boss_attacks > MAX_BOSS_ATTACKS {
            anyhow::bail!(
                "At most {} boss attacks are allowed, got {}",
                MAX_BOSS_ATTACKS,
                self.boss_attacks
            );
        }

        if self.call_timeout_secs == Some(0) {
            anyhow::bail!("Call timeout must be greater than zero seconds");
        }

        Url::parse(&self.chain.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", self.chain.rpc_url))?;

        if self.chain.poll_interval_ms == 0 {
            anyhow::bail!("Receipt poll interval must be greater than zero");
        }

        Ok(())
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize deployment config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file, or from `Punchout.toml` inside a directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_path = resolve_config_path(path)?;

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }
}

fn resolve_config_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file or directory not found: {}",
            path.display()
        );
    }

    Ok(if path.is_dir() {
        path.join(CONFIG_FILENAME)
    } else {
        path.to_path_buf()
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempdir::TempDir;

    use super::*;
    use crate::Character;

    #[test]
    fn test_presets() {
        let run = DeploymentConfig::preset(Preset::Run);
        assert_eq!(run.effective_mint_count(), 6);
        assert!(run.boss.is_none());
        assert!(run.validate().is_ok());

        let deploy = DeploymentConfig::preset(Preset::Deploy);
        assert_eq!(deploy.effective_mint_count(), 4);
        assert!(deploy.validate().is_ok());

        let boss = DeploymentConfig::preset(Preset::Boss);
        assert_eq!(boss.effective_mint_count(), 1);
        assert_eq!(boss.boss_attacks, 2);
        assert!(boss.boss.is_some());
        assert!(boss.validate().is_ok());
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("deploy").unwrap(), Preset::Deploy);
        assert_eq!(Preset::Boss.to_string(), "boss");
        assert!(Preset::from_str("everything").is_err());
    }

    #[test]
    fn test_validate_mint_count_exceeds_roster() {
        let config = DeploymentConfig {
            mint_count: Some(7),
            ..DeploymentConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Cannot mint 7 characters from a roster of 6"));
    }

    #[test]
    fn test_validate_too_many_boss_attacks() {
        let config = DeploymentConfig {
            boss_attacks: 3,
            ..DeploymentConfig::preset(Preset::Boss)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = DeploymentConfig {
            call_timeout_secs: Some(0),
            ..DeploymentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_rpc_url() {
        let mut config = DeploymentConfig::default();
        config.chain.rpc_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_call_timeout_defaults_to_unbounded() {
        assert_eq!(DeploymentConfig::default().call_timeout(), None);

        let config = DeploymentConfig {
            call_timeout_secs: Some(30),
            ..DeploymentConfig::default()
        };
        assert_eq!(config.call_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new("punchout-config").unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        let config = DeploymentConfig {
            call_timeout_secs: Some(60),
            ..DeploymentConfig::preset(Preset::Boss)
        };
        config.save_to_file(&path).unwrap();

        // Loading from the directory picks up the default file name.
        let loaded = DeploymentConfig::load_from_file(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new("punchout-config").unwrap();
        assert!(DeploymentConfig::load_from_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_layered_file_overrides_preset() {
        let dir = TempDir::new("punchout-config").unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
contract = "MyEpicGame"
mint_count = 1

[chain]
rpc_url = "http://localhost:9545"

[[roster]]
name = "Little Mac"
image_url = "https://example.com/little-mac.png"
hp = 300
attack = 25
power_attack = 75
"#,
        )
        .unwrap();

        let config = DeploymentConfig::layered(Preset::Run, Some(&path)).unwrap();
        assert_eq!(config.contract, "MyEpicGame");
        assert_eq!(config.artifacts, PathBuf::from(DEFAULT_ARTIFACTS_DIR));
        assert_eq!(config.chain.rpc_url, "http://localhost:9545");
        assert_eq!(config.chain.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(
            config.roster.characters(),
            &[Character::new(
                "Little Mac",
                "https://example.com/little-mac.png",
                300,
                25,
                75
            )]
        );
        assert!(config.validate().is_ok());
    }
}
