//! Results of a deployment run.

use std::fmt;

use alloy_core::primitives::{Address, B256};
use comfy_table::{Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};

use crate::TokenMetadata;

/// A character minted during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintedToken {
    pub character_index: usize,
    pub token_id: u64,
    pub transaction_hash: B256,
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
}

/// Outcome of one `attackBoss` call. Rejections are expected and kept as their message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossAttackOutcome {
    /// 1-based attempt number.
    pub attempt: u8,
    pub outcome: Result<B256, String>,
}

impl BossAttackOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub contract: String,
    pub address: Address,
    pub deploy_transaction: B256,
    pub minted: Vec<MintedToken>,
    pub boss_attacks: Vec<BossAttackOutcome>,
}

impl DeploymentReport {
    /// Render minted tokens and boss attacks as a table.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Step", "Character", "Token", "Result"]);

        for token in &self.minted {
            let character = token
                .metadata
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("#{}", token.character_index));
            table.add_row(vec![
                "mint".to_string(),
                character,
                token.token_id.to_string(),
                token.token_uri.clone(),
            ]);
        }

        for attack in &self.boss_attacks {
            let result = match &attack.outcome {
                Ok(hash) => format!("ok ({})", hash),
                Err(e) => format!("rejected: {}", e),
            };
            table.add_row(vec![
                format!("boss attack #{}", attack.attempt),
                String::new(),
                String::new(),
                result,
            ]);
        }

        table
    }
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contract deployed to: {}", self.address)?;
        for token in &self.minted {
            writeln!(f, "Token URI #{}: {}", token.token_id, token.token_uri)?;
        }
        for attack in &self.boss_attacks {
            match &attack.outcome {
                Ok(hash) => writeln!(f, "Boss attack #{} confirmed: {}", attack.attempt, hash)?,
                Err(e) => writeln!(f, "Boss attack #{} failed: {}", attack.attempt, e)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> DeploymentReport {
        DeploymentReport {
            contract: "NftGame".to_string(),
            address: Address::repeat_byte(0x11),
            deploy_transaction: B256::repeat_byte(0x01),
            minted: vec![MintedToken {
                character_index: 0,
                token_id: 1,
                transaction_hash: B256::repeat_byte(0x02),
                token_uri: "ipfs://token/1".to_string(),
                metadata: None,
            }],
            boss_attacks: vec![
                BossAttackOutcome {
                    attempt: 1,
                    outcome: Err("Boss is already dead".to_string()),
                },
                BossAttackOutcome {
                    attempt: 2,
                    outcome: Ok(B256::repeat_byte(0x03)),
                },
            ],
        }
    }

    #[test]
    fn test_plain_output() {
        let out = report().to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Contract deployed to: 0x1111"));
        assert_eq!(lines[1], "Token URI #1: ipfs://token/1");
        assert_eq!(lines[2], "Boss attack #1 failed: Boss is already dead");
        assert!(lines[3].starts_with("Boss attack #2 confirmed: 0x0303"));
    }

    #[test]
    fn test_table_has_one_row_per_step() {
        let table = report().to_table();
        assert_eq!(table.row_iter().count(), 3);
        assert!(table.to_string().contains("rejected: Boss is already dead"));
    }

    #[test]
    fn test_json_round_trip_keeps_rejections() {
        let report = report();
        let json = serde_json::to_string(&report).unwrap();
        let back: DeploymentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(!back.boss_attacks[0].is_success());
    }
}
