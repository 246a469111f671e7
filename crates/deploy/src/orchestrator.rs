//! Deployment workflow: deploy the game contract, mint characters in order, then optionally
//! fight the boss.
//!
//! Every chain call is awaited before the next one is issued: a `tokenURI` read is only
//! consistent once the mint it depends on is mined.

use std::{fmt, future::Future, time::Duration};

use alloy_core::primitives::B256;
use anyhow::{Context, Result};

use crate::{
    BossAttackOutcome, ChainClient, ContractFactory, DeploymentConfig, DeploymentReport,
    MintedToken, NftGame, TokenMetadata,
};

/// Where a run currently is.
///
/// `Uninitialized -> Deploying -> Deployed -> Minting(0..n) -> [BossAttacking(1..=2)] -> Done`,
/// or `Failed` from any state on an unrecovered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Deploying,
    Deployed,
    Minting(usize),
    BossAttacking(u8),
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Uninitialized => write!(f, "uninitialized"),
            RunState::Deploying => write!(f, "deploying"),
            RunState::Deployed => write!(f, "deployed"),
            RunState::Minting(index) => write!(f, "minting #{}", index),
            RunState::BossAttacking(attempt) => write!(f, "boss attack #{}", attempt),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Await `fut`, failing after `timeout` if one is set.
async fn bounded<T, F>(timeout: Option<Duration>, what: impl fmt::Display, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| anyhow::anyhow!("Timed out after {:?} waiting for {}", limit, what))?,
        None => fut.await,
    }
}

/// Drives one deployment run against a chain.
pub struct Orchestrator<'a, C> {
    chain: &'a C,
    config: DeploymentConfig,
    state: RunState,
}

impl<'a, C: ChainClient> Orchestrator<'a, C> {
    pub fn new(chain: &'a C, config: DeploymentConfig) -> Self {
        Self {
            chain,
            config,
            state: RunState::Uninitialized,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Run state transition");
        self.state = next;
    }

    /// Execute the whole workflow. Leaves the orchestrator in [`RunState::Done`] or
    /// [`RunState::Failed`].
    pub async fn run(&mut self) -> Result<DeploymentReport> {
        match self.execute().await {
            Ok(report) => {
                self.transition(RunState::Done);
                tracing::info!(
                    address = %report.address,
                    minted = report.minted.len(),
                    "Deployment run complete"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    state = %self.state,
                    error = %format!("{:#}", e),
                    "Deployment run failed"
                );
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<DeploymentReport> {
        self.config
            .validate()
            .context("Invalid deployment configuration")?;

        let chain = self.chain;
        let timeout = self.config.call_timeout();

        let factory =
            ContractFactory::from_artifacts(&self.config.artifacts, &self.config.contract)
                .with_context(|| {
                    format!(
                        "Failed to resolve contract factory for {}",
                        self.config.contract
                    )
                })?;

        // Deploy
        self.transition(RunState::Deploying);
        tracing::info!(
            contract = %factory.name(),
            characters = self.config.roster.len(),
            boss = self.config.boss.as_ref().map(|b| b.name.as_str()),
            "Deploying contract..."
        );

        let deploy_tx = bounded(
            timeout,
            "deployment submission",
            factory.deploy(chain, &self.config.roster, self.config.boss.as_ref()),
        )
        .await?;

        let deploy_receipt = bounded(
            timeout,
            "deployment confirmation",
            chain.wait_for_receipt(&deploy_tx),
        )
        .await
        .context("Failed to confirm deployment")?;

        let game = NftGame::from_deploy_receipt(&deploy_receipt, chain)?;
        self.transition(RunState::Deployed);
        tracing::info!(address = %game.address(), tx_hash = %deploy_tx, "Contract deployed");

        // Mint
        let minted = self.mint_all(&game, timeout).await?;

        // Boss
        let boss_attacks = if self.config.boss.is_none() {
            Vec::new()
        } else if minted.is_empty() {
            tracing::warn!("No character minted, skipping boss attacks");
            Vec::new()
        } else {
            self.attack_boss(&game, timeout).await
        };

        Ok(DeploymentReport {
            contract: factory.name().to_string(),
            address: game.address(),
            deploy_transaction: deploy_tx.hash(),
            minted,
            boss_attacks,
        })
    }

    async fn mint_all(
        &mut self,
        game: &NftGame<'a, C>,
        timeout: Option<Duration>,
    ) -> Result<Vec<MintedToken>> {
        let mint_count = self.config.effective_mint_count();
        let mut minted = Vec::with_capacity(mint_count);

        for index in 0..mint_count {
            self.transition(RunState::Minting(index));

            let tx = bounded(timeout, format!("mint #{}", index), game.mint_character(index))
                .await?;

            bounded(
                timeout,
                format!("mint #{} confirmation", index),
                self.chain.wait_for_receipt(&tx),
            )
            .await
            .and_then(|receipt| receipt.ensure_success())
            .with_context(|| format!("Mint of character #{} failed", index))?;

            // Token ids start at 1.
            let token_id = index as u64 + 1;
            let token_uri = bounded(
                timeout,
                format!("tokenURI({})", token_id),
                game.token_uri(token_id),
            )
            .await?;

            let metadata = match TokenMetadata::from_token_uri(&token_uri) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!(token_id, error = %e, "Token URI is not decodable metadata");
                    None
                }
            };

            tracing::info!(
                index,
                token_id,
                tx_hash = %tx,
                token_uri = %token_uri,
                "Character minted"
            );

            minted.push(MintedToken {
                character_index: index,
                token_id,
                transaction_hash: tx.hash(),
                token_uri,
                metadata,
            });
        }

        Ok(minted)
    }

    /// Attack the boss up to the configured number of times. Rejections never abort the run.
    async fn attack_boss(
        &mut self,
        game: &NftGame<'a, C>,
        timeout: Option<Duration>,
    ) -> Vec<BossAttackOutcome> {
        let chain = self.chain;
        let mut outcomes = Vec::with_capacity(self.config.boss_attacks as usize);

        for attempt in 1..=self.config.boss_attacks {
            self.transition(RunState::BossAttacking(attempt));

            let outcome: Result<B256> = async {
                let tx = bounded(timeout, "boss attack", game.attack_boss()).await?;
                // Await this attack's own transaction.
                bounded(
                    timeout,
                    "boss attack confirmation",
                    chain.wait_for_receipt(&tx),
                )
                .await?
                .ensure_success()
                .map(|receipt| receipt.transaction_hash)
            }
            .await;

            match &outcome {
                Ok(hash) => tracing::info!(attempt, tx_hash = %hash, "Boss attacked"),
                Err(e) => {
                    tracing::warn!(attempt, error = %format!("{:#}", e), "Boss attack rejected")
                }
            }

            outcomes.push(BossAttackOutcome {
                attempt,
                outcome: outcome.map_err(|e| format!("{:#}", e)),
            });
        }

        outcomes
    }
}

/// Run a deployment with the given chain and configuration.
pub async fn run_deployment<C: ChainClient>(
    chain: &C,
    config: DeploymentConfig,
) -> Result<DeploymentReport> {
    Orchestrator::new(chain, config).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_without_timeout_waits() {
        let value = bounded(None, "sleep", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded(
            Some(Duration::from_millis(10)),
            "forever",
            std::future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Timed out"));
        assert!(err.to_string().contains("forever"));
    }

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::Minting(3).to_string(), "minting #3");
        assert_eq!(RunState::BossAttacking(2).to_string(), "boss attack #2");
    }
}
