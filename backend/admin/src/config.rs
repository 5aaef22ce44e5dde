//! Application configuration loaded from environment variables.

use std::time::Duration;

use alloy_primitives::Address;

use crate::errors::{AdminError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint of the node/wallet that signs for us
    pub rpc_url: String,
    /// Address of the deployed report registry contract
    pub contract_address: Address,
    /// Sending account; when unset the node's first unlocked account is used
    pub account: Option<Address>,
    /// Expected chain id (e.g. 4 for Rinkeby, 999 for a local Ganache)
    pub chain_id: Option<u64>,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in milliseconds) to poll for a pending transaction's receipt
    pub receipt_poll_interval_ms: u64,
    /// Per-request timeout for the JSON-RPC client
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is the
    /// production entry point; tests feed a map instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            rpc_url: var("RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8545".to_string()),
            contract_address: var("CONTRACT_ADDRESS")
                .ok_or_else(|| {
                    AdminError::Config(
                        "CONTRACT_ADDRESS environment variable is required".to_string(),
                    )
                })?
                .parse()
                .map_err(|_| AdminError::Config("Invalid CONTRACT_ADDRESS".to_string()))?,
            account: var("ACCOUNT")
                .map(|v| v.parse())
                .transpose()
                .map_err(|_| AdminError::Config("Invalid ACCOUNT".to_string()))?,
            chain_id: var("CHAIN_ID")
                .map(|v| v.parse())
                .transpose()
                .map_err(|_| AdminError::Config("Invalid CHAIN_ID".to_string()))?,
            api_port: var("API_PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .map_err(|_| AdminError::Config("Invalid API_PORT".to_string()))?,
            receipt_poll_interval_ms: var("RECEIPT_POLL_INTERVAL_MS")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .map_err(|_| AdminError::Config("Invalid RECEIPT_POLL_INTERVAL_MS".to_string()))?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| AdminError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?,
        })
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
