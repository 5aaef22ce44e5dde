//! Provider adapter: the wallet/node seam.
//!
//! [`Chain`] is the handful of node methods the gateways need. The live
//! implementation is [`crate::rpc::HttpChain`]; tests substitute an
//! in-memory registry.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use tracing::info;

use crate::contract::RegistryContract;
use crate::errors::{AdminError, Result};
use crate::rpc::{LogFilter, RawLog, TransactionReceipt, TransactionRequest};

#[async_trait]
pub trait Chain: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    /// Accounts the node/wallet is willing to sign for, selected account first.
    async fn accounts(&self) -> Result<Vec<Address>>;

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes>;

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256>;

    /// `None` while the transaction is still pending.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>>;

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>>;
}

pub struct ProviderAdapter {
    chain: Arc<dyn Chain>,
    pinned_account: Option<Address>,
    contract: RegistryContract,
}

impl ProviderAdapter {
    pub fn new(
        chain: Arc<dyn Chain>,
        contract_address: Address,
        pinned_account: Option<Address>,
        receipt_poll_interval: Duration,
    ) -> Self {
        let contract = RegistryContract::new(chain.clone(), contract_address, receipt_poll_interval);
        Self {
            chain,
            pinned_account,
            contract,
        }
    }

    /// The account writes are sent from.
    ///
    /// Not cached: the wallet may switch accounts between calls.
    pub async fn current_account(&self) -> Result<Address> {
        if let Some(account) = self.pinned_account {
            return Ok(account);
        }
        self.chain
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or_else(|| AdminError::Rejected("no account authorised by the wallet".to_string()))
    }

    pub fn contract(&self) -> &RegistryContract {
        &self.contract
    }

    /// Refuse to run against a chain other than the one the contract lives on.
    pub async fn ensure_chain(&self, expected: Option<u64>) -> Result<u64> {
        let actual = self.chain.chain_id().await?;
        match expected {
            Some(expected) if expected != actual => Err(AdminError::Config(format!(
                "node is on chain {actual}, contract is configured for chain {expected}"
            ))),
            _ => {
                info!(chain_id = actual, contract = %self.contract.address(), "Connected to chain");
                Ok(actual)
            }
        }
    }
}
