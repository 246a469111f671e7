//! Binding for the NFT game contract: factory resolution, constructor encoding, and the
//! deployed contract handle.

use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, Bytes, U256};
use alloy_core::sol_types::{SolCall, SolValue};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{BossRecord, ChainClient, CharacterRoster, PendingTransaction, TransactionReceipt};

alloy_core::sol_types::sol! {
    #![sol(alloy_sol_types = ::alloy_core::sol_types)]

    /// Post-deploy surface of the game contract.
    interface INftGame {
        function mintCharacter(uint256 characterIndex) external;
        function tokenURI(uint256 tokenId) external view returns (string memory uri);
        function attackBoss() external;
    }
}

/// The subset of a Hardhat compilation artifact needed to deploy a contract.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    bytecode: String,
}

/// Resolved contract blueprint able to produce deployment transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFactory {
    name: String,
    bytecode: Bytes,
}

impl ContractFactory {
    pub fn new(name: impl Into<String>, bytecode: Bytes) -> Self {
        Self {
            name: name.into(),
            bytecode,
        }
    }

    /// Resolve a factory by contract name from a Hardhat `artifacts` directory.
    ///
    /// Artifacts live at `<dir>/contracts/<File>.sol/<Name>.json`; the directory is searched
    /// recursively for `<name>.json`.
    pub fn from_artifacts(artifacts_dir: &Path, name: &str) -> Result<Self> {
        let artifact_path = find_artifact(artifacts_dir, name)?.with_context(|| {
            format!(
                "No artifact for contract {} found under {}",
                name,
                artifacts_dir.display()
            )
        })?;

        let content = std::fs::read_to_string(&artifact_path)
            .with_context(|| format!("Failed to read {}", artifact_path.display()))?;
        let artifact: HardhatArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", artifact_path.display()))?;

        if artifact.contract_name != name {
            anyhow::bail!(
                "Artifact {} describes contract {}, expected {}",
                artifact_path.display(),
                artifact.contract_name,
                name
            );
        }

        let bytecode = hex::decode(artifact.bytecode.trim_start_matches("0x"))
            .with_context(|| format!("Invalid bytecode in {}", artifact_path.display()))?;
        if bytecode.is_empty() {
            anyhow::bail!(
                "Contract {} has no creation bytecode (abstract contract or interface?)",
                name
            );
        }

        tracing::debug!(
            contract = %name,
            artifact = %artifact_path.display(),
            bytecode_len = bytecode.len(),
            "Contract artifact loaded"
        );

        Ok(Self::new(name, bytecode.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn deploy_calldata(&self, roster: &CharacterRoster, boss: Option<&BossRecord>) -> Bytes {
        let mut data = self.bytecode.to_vec();
        data.extend_from_slice(&encode_constructor_args(roster, boss));
        data.into()
    }

    /// Submit the deployment transaction.
    pub async fn deploy<C: ChainClient>(
        &self,
        chain: &C,
        roster: &CharacterRoster,
        boss: Option<&BossRecord>,
    ) -> Result<PendingTransaction> {
        chain
            .deploy_contract(self.deploy_calldata(roster, boss))
            .await
            .with_context(|| format!("Failed to deploy {}", self.name))
    }
}

/// ABI-encode the constructor parameters: the five roster columns, then the boss fields
/// when a boss is configured.
pub fn encode_constructor_args(roster: &CharacterRoster, boss: Option<&BossRecord>) -> Vec<u8> {
    let columns = roster.columns();
    match boss {
        None => (
            columns.names,
            columns.image_urls,
            columns.hp,
            columns.attack,
            columns.power_attack,
        )
            .abi_encode_params(),
        Some(boss) => (
            columns.names,
            columns.image_urls,
            columns.hp,
            columns.attack,
            columns.power_attack,
            boss.name.clone(),
            boss.image_url.clone(),
            U256::from(boss.hp),
            U256::from(boss.attack),
        )
            .abi_encode_params(),
    }
}

fn find_artifact(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    let file_name = format!("{}.json", name);
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?
            .path();
        if path.is_dir() {
            // build-info holds compiler inputs, never artifacts.
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            subdirs.push(path);
        } else if path.file_name().is_some_and(|n| n == file_name.as_str()) {
            return Ok(Some(path));
        }
    }

    subdirs.sort();
    for subdir in subdirs {
        if let Some(found) = find_artifact(&subdir, name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Handle to a deployed game contract.
#[derive(Debug)]
pub struct NftGame<'a, C> {
    address: Address,
    chain: &'a C,
}

impl<'a, C: ChainClient> NftGame<'a, C> {
    pub fn at(address: Address, chain: &'a C) -> Self {
        Self { address, chain }
    }

    /// Build the handle from a confirmed deployment receipt.
    pub fn from_deploy_receipt(receipt: &TransactionReceipt, chain: &'a C) -> Result<Self> {
        if !receipt.success {
            anyhow::bail!("Deployment transaction {} reverted", receipt.transaction_hash);
        }
        let address = receipt.contract_address.with_context(|| {
            format!(
                "Deployment receipt {} has no contract address",
                receipt.transaction_hash
            )
        })?;
        Ok(Self::at(address, chain))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn mint_character(&self, index: usize) -> Result<PendingTransaction> {
        let calldata = INftGame::mintCharacterCall {
            characterIndex: U256::from(index),
        }
        .abi_encode();

        self.chain
            .send_transaction(self.address, calldata.into())
            .await
            .with_context(|| format!("Failed to mint character #{}", index))
    }

    pub async fn token_uri(&self, token_id: u64) -> Result<String> {
        let calldata = INftGame::tokenURICall {
            tokenId: U256::from(token_id),
        }
        .abi_encode();

        let raw = self
            .chain
            .read_view(self.address, calldata.into())
            .await
            .with_context(|| format!("Failed to read tokenURI({})", token_id))?;

        let decoded = INftGame::tokenURICall::abi_decode_returns(&raw, true)
            .with_context(|| format!("Failed to decode tokenURI({}) result", token_id))?;

        Ok(decoded.uri)
    }

    pub async fn attack_boss(&self) -> Result<PendingTransaction> {
        let calldata = INftGame::attackBossCall {}.abi_encode();

        self.chain
            .send_transaction(self.address, calldata.into())
            .await
            .context("Failed to attack boss")
    }
}
