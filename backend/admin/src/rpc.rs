//! Ethereum JSON-RPC client. The only code in the crate that talks HTTP to
//! the node.
//!
//! ## Error classification
//!
//! * Connection failures, non-2xx responses and malformed payloads are
//!   [`AdminError::Transport`].
//! * A JSON-RPC error with code [`USER_REJECTED_CODE`] (or the legacy
//!   "User denied" wording) is [`AdminError::Rejected`].
//! * On writes, code [`EXECUTION_REVERTED_CODE`] or a "revert" message is
//!   [`AdminError::Chain`]; every other RPC error is a transport failure.
//!
//! Nothing here retries.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{AdminError, Result};
use crate::provider::Chain;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1474 "execution reverted".
pub const EXECUTION_REVERTED_CODE: i64 = 3;

// ─────────────────────────────────────────────────────────
// JSON-RPC wire shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Whether a request only reads chain state or asks the signer for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

impl RpcError {
    pub fn classify(&self, kind: CallKind, method: &str) -> AdminError {
        let lower = self.message.to_lowercase();
        let detail = format!("{method} failed ({}): {}", self.code, self.message);

        if self.code == USER_REJECTED_CODE
            || lower.contains("user denied")
            || lower.contains("user rejected")
        {
            return AdminError::Rejected(detail);
        }

        match kind {
            CallKind::Write if self.code == EXECUTION_REVERTED_CODE || lower.contains("revert") => {
                AdminError::Chain(detail)
            }
            _ => AdminError::Transport(detail),
        }
    }
}

/// Transaction fields as accepted by `eth_call` and `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` failure. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s != U64::ZERO)
    }
}

/// A log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<U64>,
    pub log_index: Option<U64>,
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub removed: bool,
}

/// `eth_getLogs` filter over the full history of one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub from_block: String,
    pub to_block: String,
    pub topics: Vec<B256>,
}

impl LogFilter {
    /// Every log with `topic0` emitted by `address`, from genesis to the chain head.
    pub fn full_history(address: Address, topic0: B256) -> Self {
        Self {
            address,
            from_block: "0x0".to_string(),
            to_block: "latest".to_string(),
            topics: vec![topic0],
        }
    }
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue one JSON-RPC request and decode its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        kind: CallKind,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let resp = self
            .client
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AdminError::Transport(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(err.classify(kind, method));
        }

        debug!(method, id, "RPC request completed");
        Ok(serde_json::from_value(body.result)?)
    }
}

/// [`Chain`] backed by a live node over HTTP.
pub struct HttpChain {
    rpc: JsonRpcClient,
}

impl HttpChain {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            rpc: JsonRpcClient::new(client, url),
        }
    }
}

#[async_trait]
impl Chain for HttpChain {
    async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self
            .rpc
            .request("eth_chainId", json!([]), CallKind::Read)
            .await?;
        Ok(id.to::<u64>())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.rpc
            .request("eth_accounts", json!([]), CallKind::Read)
            .await
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        self.rpc
            .request("eth_call", json!([request, "latest"]), CallKind::Read)
            .await
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256> {
        self.rpc
            .request("eth_sendTransaction", json!([request]), CallKind::Write)
            .await
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        self.rpc
            .request("eth_getTransactionReceipt", json!([hash]), CallKind::Read)
            .await
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        self.rpc
            .request("eth_getLogs", json!([filter]), CallKind::Read)
            .await
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
