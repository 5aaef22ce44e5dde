//! The report registry contract interface and typed call helpers.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use tracing::{debug, info, warn};

use crate::errors::{AdminError, Result};
use crate::provider::Chain;
use crate::rpc::{LogFilter, TransactionReceipt, TransactionRequest};

sol! {
    /// ABI of the deployed registry. Selectors are derived from these
    /// signatures, so names and parameter types must match the deployment
    /// exactly, `updateMaxDealy` included.
    interface ReportRegistry {
        event NewUser(address sender, string name);

        function getReportCount() external view returns (uint256 count);
        function getReportAtIndex(uint256 index) external view returns (bytes32 key);
        function reports(bytes32 key) external view returns (
            address sender,
            bool signed,
            uint256 ph,
            uint256 hardness,
            uint256 tds,
            string companyName,
            uint256 timestamp
        );
        function getReport(bytes32 key) external view returns (
            address sender,
            bool signed,
            uint256 ph,
            uint256 hardness,
            uint256 tds,
            string companyName,
            uint256 timestamp
        );
        function users(address account) external view returns (
            address account,
            string name,
            uint256 balance,
            uint256 lastReport
        );
        function delayFee() external view returns (uint256 fee);
        function maxDelay() external view returns (uint256 delay);
        function admin() external view returns (address admin);

        function newReport(bool signed, uint256 ph, uint256 hardness, uint256 tds, string companyName) external;
        function updateReport(bytes32 key, bool signed) external;
        function remReport(bytes32 key) external;
        function createUser(string name) external;
        function updateMaxDealy(uint256 delay) external;
        function updateFee(uint256 fee) external;
        function changeAdmin(address admin) external;
        function deposit() external payable;
    }
}

/// Handle to the registry at a fixed address.
#[derive(Clone)]
pub struct RegistryContract {
    chain: Arc<dyn Chain>,
    address: Address,
    receipt_poll_interval: Duration,
}

impl RegistryContract {
    pub fn new(chain: Arc<dyn Chain>, address: Address, receipt_poll_interval: Duration) -> Self {
        Self {
            chain,
            address,
            receipt_poll_interval,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `eth_call` against the latest block and decode the return data.
    pub async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let request = TransactionRequest {
            from: None,
            to: self.address,
            data: call.abi_encode().into(),
            value: None,
        };
        let data = self.chain.call(&request).await?;
        debug!(method = C::SIGNATURE, bytes = data.len(), "Contract read");
        Ok(C::abi_decode_returns(&data, true)?)
    }

    /// Submit a transaction and wait until it is mined.
    ///
    /// Polls for the receipt every `receipt_poll_interval` with no upper
    /// bound. A receipt with failure status is a [`AdminError::Chain`].
    pub async fn write<C: SolCall>(
        &self,
        from: Address,
        call: C,
        value: Option<U256>,
    ) -> Result<TransactionReceipt> {
        let request = TransactionRequest {
            from: Some(from),
            to: self.address,
            data: call.abi_encode().into(),
            value,
        };
        let hash = self.chain.send_transaction(&request).await?;
        info!(method = C::SIGNATURE, %from, tx = %hash, "Transaction submitted");

        let receipt = loop {
            if let Some(receipt) = self.chain.transaction_receipt(hash).await? {
                break receipt;
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        };

        if !receipt.succeeded() {
            warn!(method = C::SIGNATURE, tx = %hash, "Transaction reverted");
            return Err(AdminError::Chain(format!(
                "{} reverted in transaction {hash}",
                C::SIGNATURE
            )));
        }

        info!(
            method = C::SIGNATURE,
            tx = %hash,
            block = ?receipt.block_number,
            "Transaction mined"
        );
        Ok(receipt)
    }

    /// Every `E` emitted by the contract since genesis, in emission order.
    pub async fn events<E: SolEvent>(&self) -> Result<Vec<E>> {
        let filter = LogFilter::full_history(self.address, E::SIGNATURE_HASH);
        let mut logs = self.chain.logs(&filter).await?;
        logs.retain(|log| !log.removed);
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        debug!(event = E::SIGNATURE, count = logs.len(), "Scanned event logs");

        logs.iter()
            .map(|log| {
                E::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                    .map_err(AdminError::from)
            })
            .collect()
    }
}
