//! JSON-RPC chain client for Ethereum development nodes (Hardhat node, Anvil).
//!
//! Transactions are sent with `eth_sendTransaction`, so the sender must be an account the
//! node has unlocked.

use std::time::Duration;

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::Context;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{ChainClient, ChainSettings, PendingTransaction, TransactionReceipt};

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of `eth_chainId` attempts made while the node is starting up.
const CONNECT_RETRIES: usize = 5;

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
///
/// # Arguments
/// * `client` - The HTTP client to use
/// * `url` - The RPC endpoint URL
/// * `method` - The RPC method name
/// * `params` - The method parameters
///
/// # Returns
/// The deserialized result, or an error if the request failed or returned an error response.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    tracing::debug!(method = %method, "JSON-RPC call");

    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request", method))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    if let Some(error) = result.get("error") {
        anyhow::bail!("RPC error: {}", rpc_error_message(error));
    }

    let result_value = result
        .get("result")
        .context("No result in response")?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// Extract a readable message from a JSON-RPC error object, including revert data when the
/// node returns it.
fn rpc_error_message(error: &Value) -> String {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown");

    match error.get("data") {
        Some(Value::String(data)) => format!("{} (data: {})", message, data),
        Some(Value::Object(data)) => match data.get("message").and_then(|m| m.as_str()) {
            Some(inner) if inner != message => format!("{} ({})", message, inner),
            _ => message.to_string(),
        },
        _ => message.to_string(),
    }
}

/// Parse a hex-encoded JSON-RPC quantity.
fn parse_quantity(value: &str) -> anyhow::Result<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: {}", value))
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    /// Absent on pre-Byzantium chains.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_address: Option<Address>,
    #[serde(default)]
    block_number: Option<String>,
}

impl RpcReceipt {
    fn into_receipt(self) -> anyhow::Result<TransactionReceipt> {
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };
        let block_number = self.block_number.as_deref().map(parse_quantity).transpose()?;

        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            success,
            contract_address: self.contract_address,
            block_number,
        })
    }
}

/// [`ChainClient`] backed by a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcChain {
    client: reqwest::Client,
    url: String,
    from: Address,
    chain_id: u64,
    poll_interval: Duration,
}

impl JsonRpcChain {
    /// Connect to the node, waiting for it to answer `eth_chainId`, and resolve the sender.
    pub async fn connect(settings: &ChainSettings) -> anyhow::Result<Self> {
        let client = create_client()?;
        let url = settings.rpc_url.clone();

        let chain_id: String = (|| json_rpc_call::<String>(&client, &url, "eth_chainId", vec![]))
            .retry(ExponentialBuilder::default().with_max_times(CONNECT_RETRIES))
            .notify(|err: &anyhow::Error, dur: Duration| {
                tracing::debug!(error = %err, retry_in = ?dur, "Node not reachable yet, retrying...");
            })
            .await
            .with_context(|| format!("Failed to reach JSON-RPC node at {}", url))?;
        let chain_id = parse_quantity(&chain_id)?;

        let from = match settings.from {
            Some(from) => from,
            None => {
                let accounts: Vec<Address> =
                    json_rpc_call(&client, &url, "eth_accounts", vec![])
                        .await
                        .context("Failed to list node accounts")?;
                accounts
                    .first()
                    .copied()
                    .context("Node exposes no unlocked account, set `chain.from`")?
            }
        };

        tracing::info!(url = %url, chain_id, from = %from, "Connected to chain");

        Ok(Self {
            client,
            url,
            from,
            chain_id,
            poll_interval: settings.poll_interval(),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn from(&self) -> Address {
        self.from
    }

    async fn send(&self, tx: Value) -> anyhow::Result<PendingTransaction> {
        let hash: B256 = json_rpc_call(&self.client, &self.url, "eth_sendTransaction", vec![tx])
            .await?;
        tracing::debug!(tx_hash = %hash, "Transaction submitted");
        Ok(PendingTransaction::from(hash))
    }
}

impl ChainClient for JsonRpcChain {
    async fn deploy_contract(&self, init_code: Bytes) -> anyhow::Result<PendingTransaction> {
        self.send(serde_json::json!({
            "from": self.from,
            "data": init_code,
        }))
        .await
    }

    async fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> anyhow::Result<PendingTransaction> {
        self.send(serde_json::json!({
            "from": self.from,
            "to": to,
            "data": calldata,
        }))
        .await
    }

    async fn wait_for_receipt(
        &self,
        tx: &PendingTransaction,
    ) -> anyhow::Result<TransactionReceipt> {
        loop {
            let receipt: Option<RpcReceipt> = json_rpc_call(
                &self.client,
                &self.url,
                "eth_getTransactionReceipt",
                vec![serde_json::json!(tx.hash())],
            )
            .await
            .with_context(|| format!("Failed to fetch receipt for {}", tx))?;

            if let Some(receipt) = receipt {
                return receipt.into_receipt();
            }

            tracing::trace!(tx_hash = %tx, "Transaction not mined yet, polling...");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn read_view(&self, to: Address, calldata: Bytes) -> anyhow::Result<Bytes> {
        json_rpc_call(
            &self.client,
            &self.url,
            "eth_call",
            vec![
                serde_json::json!({
                    "from": self.from,
                    "to": to,
                    "data": calldata,
                }),
                serde_json::json!("latest"),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x7a69").unwrap(), 31337);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_receipt_success_with_contract_address() {
        let raw = serde_json::json!({
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "status": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "blockNumber": "0x2",
            "gasUsed": "0x5208",
            "logs": []
        });

        let receipt: RpcReceipt = serde_json::from_value(raw).unwrap();
        let receipt = receipt.into_receipt().unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.block_number, Some(2));
        assert_eq!(
            receipt.contract_address.unwrap().to_string().to_lowercase(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_receipt_reverted() {
        let raw = serde_json::json!({
            "transactionHash": "0x2222222222222222222222222222222222222222222222222222222222222222",
            "status": "0x0",
            "contractAddress": null,
            "blockNumber": "0x10"
        });

        let receipt: RpcReceipt = serde_json::from_value(raw).unwrap();
        let receipt = receipt.into_receipt().unwrap();

        assert!(!receipt.success);
        assert!(receipt.contract_address.is_none());
        assert_eq!(receipt.block_number, Some(16));
    }

    #[test]
    fn test_receipt_without_status_is_success() {
        let raw = serde_json::json!({
            "transactionHash": "0x3333333333333333333333333333333333333333333333333333333333333333"
        });

        let receipt: RpcReceipt = serde_json::from_value(raw).unwrap();
        assert!(receipt.into_receipt().unwrap().success);
    }

    #[test]
    fn test_rpc_error_message_includes_revert_reason() {
        let error = serde_json::json!({
            "code": -32603,
            "message": "Error: VM Exception while processing transaction",
            "data": { "message": "reverted with reason string 'Boss is dead'" }
        });
        assert_eq!(
            rpc_error_message(&error),
            "Error: VM Exception while processing transaction (reverted with reason string 'Boss is dead')"
        );

        let error = serde_json::json!({ "message": "execution reverted", "data": "0x08c379a0" });
        assert_eq!(rpc_error_message(&error), "execution reverted (data: 0x08c379a0)");

        assert_eq!(rpc_error_message(&serde_json::json!({})), "unknown");
    }
}
