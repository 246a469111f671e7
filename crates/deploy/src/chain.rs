//! Chain capability used by the orchestrator.
//!
//! The orchestrator never talks to a node directly; it goes through [`ChainClient`], so a
//! JSON-RPC node ([`crate::JsonRpcChain`]) and an in-memory fake are interchangeable.

use std::future::Future;

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::Result;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

/// Hash of a submitted transaction whose receipt has not been awaited yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Deref, Display, From)]
pub struct PendingTransaction(B256);

impl PendingTransaction {
    pub fn hash(&self) -> B256 {
        self.0
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// `false` when the transaction reverted.
    pub success: bool,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

impl TransactionReceipt {
    /// Fail if the transaction reverted.
    pub fn ensure_success(self) -> Result<Self> {
        if !self.success {
            anyhow::bail!("Transaction {} reverted", self.transaction_hash);
        }
        Ok(self)
    }
}

/// Minimal set of chain operations needed to deploy and drive a contract.
///
/// State-changing calls return a [`PendingTransaction`]; callers must await
/// [`ChainClient::wait_for_receipt`] before reading state those calls modify.
pub trait ChainClient: Send + Sync {
    /// Submit a contract creation transaction with the given init code.
    fn deploy_contract(&self, init_code: Bytes)
    -> impl Future<Output = Result<PendingTransaction>> + Send;

    /// Submit a state-changing call to `to`.
    fn send_transaction(
        &self,
        to: Address,
        calldata: Bytes,
    ) -> impl Future<Output = Result<PendingTransaction>> + Send;

    /// Wait until the transaction is mined and return its receipt.
    fn wait_for_receipt(
        &self,
        tx: &PendingTransaction,
    ) -> impl Future<Output = Result<TransactionReceipt>> + Send;

    /// Execute a read-only call against the latest state and return the raw return data.
    fn read_view(&self, to: Address, calldata: Bytes) -> impl Future<Output = Result<Bytes>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(success: bool) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(0xab),
            success,
            contract_address: None,
            block_number: Some(7),
        }
    }

    #[test]
    fn test_ensure_success() {
        assert!(receipt(true).ensure_success().is_ok());

        let err = receipt(false).ensure_success().unwrap_err();
        assert!(err.to_string().contains("reverted"));
    }

    #[test]
    fn test_pending_transaction_display_is_hash() {
        let tx = PendingTransaction::from(B256::repeat_byte(0x01));
        assert_eq!(tx.to_string(), B256::repeat_byte(0x01).to_string());
        assert_eq!(*tx, tx.hash());
    }
}
