//! In-memory stand-in for a node with the registry deployed.
//!
//! Calldata is decoded with the same `sol!` interface the gateways encode
//! with, so a wrong selector or argument order fails here just as it would
//! on chain.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256, U64};
use alloy_sol_types::{SolCall, SolEvent, SolInterface};
use async_trait::async_trait;

use crate::contract::ReportRegistry::{self, ReportRegistryCalls};
use crate::errors::{AdminError, Result};
use crate::provider::Chain;
use crate::rpc::{LogFilter, RawLog, TransactionReceipt, TransactionRequest};

const GENESIS_TIMESTAMP: u64 = 1_704_067_200;

#[derive(Debug, Clone)]
struct StoredReport {
    sender: Address,
    signed: bool,
    ph: U256,
    hardness: U256,
    tds: U256,
    company_name: String,
    timestamp: U256,
}

#[derive(Debug, Clone)]
struct StoredUser {
    name: String,
    balance: U256,
    last_report: U256,
}

#[derive(Debug)]
struct State {
    selected: Option<Address>,
    admin: Address,
    max_delay: U256,
    delay_fee: U256,
    index: Vec<B256>,
    reports: HashMap<B256, StoredReport>,
    users: HashMap<Address, StoredUser>,
    logs: Vec<RawLog>,
    receipts: HashMap<B256, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    block: u64,
    reject_next_send: bool,
    garbage_calls: bool,
    calls_until_failure: Option<usize>,
    receipt_delay: usize,
    receipt_polls: usize,
}

pub struct FakeRegistry {
    state: Mutex<State>,
}

impl FakeRegistry {
    pub const ADDRESS: Address = Address::repeat_byte(0xc0);
    pub const ADMIN: Address = Address::repeat_byte(0xad);
    pub const CHAIN_ID: u64 = 999;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                selected: Some(Self::ADMIN),
                admin: Self::ADMIN,
                max_delay: U256::from(3600),
                delay_fee: U256::from(10_000_000_000_000_000u64),
                index: Vec::new(),
                reports: HashMap::new(),
                users: HashMap::new(),
                logs: Vec::new(),
                receipts: HashMap::new(),
                sent: Vec::new(),
                block: 1,
                reject_next_send: false,
                garbage_calls: false,
                calls_until_failure: None,
                receipt_delay: 0,
                receipt_polls: 0,
            }),
        }
    }

    // ── knobs ────────────────────────────────────────────

    pub fn select_account(&self, account: Option<Address>) {
        self.state.lock().unwrap().selected = account;
    }

    /// The next `eth_sendTransaction` is declined as if by the wallet user.
    pub fn reject_next_send(&self) {
        self.state.lock().unwrap().reject_next_send = true;
    }

    /// Let `n` more `eth_call`s succeed, then fail every one after.
    pub fn fail_calls_after(&self, n: usize) {
        self.state.lock().unwrap().calls_until_failure = Some(n);
    }

    pub fn answer_calls_with_garbage(&self, on: bool) {
        self.state.lock().unwrap().garbage_calls = on;
    }

    /// Report the next `n` receipt lookups as pending.
    pub fn delay_receipts(&self, n: usize) {
        self.state.lock().unwrap().receipt_delay = n;
    }

    // ── inspection ───────────────────────────────────────

    pub fn receipt_polls(&self) -> usize {
        self.state.lock().unwrap().receipt_polls
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn max_delay(&self) -> U256 {
        self.state.lock().unwrap().max_delay
    }

    pub fn delay_fee(&self) -> U256 {
        self.state.lock().unwrap().delay_fee
    }

    pub fn admin(&self) -> Address {
        self.state.lock().unwrap().admin
    }

    pub fn report_count(&self) -> usize {
        self.state.lock().unwrap().index.len()
    }
}

impl State {
    fn answer(&self, call: ReportRegistryCalls) -> Result<Vec<u8>> {
        use ReportRegistry::*;

        Ok(match call {
            ReportRegistryCalls::getReportCount(_) => {
                getReportCountCall::abi_encode_returns(&(U256::from(self.index.len()),))
            }
            ReportRegistryCalls::getReportAtIndex(c) => {
                if c.index >= U256::from(self.index.len()) {
                    return Err(AdminError::Transport("execution reverted".to_string()));
                }
                let key = self.index[c.index.to::<usize>()];
                getReportAtIndexCall::abi_encode_returns(&(key,))
            }
            ReportRegistryCalls::reports(c) => {
                reportsCall::abi_encode_returns(&self.report_tuple(&c.key))
            }
            ReportRegistryCalls::getReport(c) => {
                getReportCall::abi_encode_returns(&self.report_tuple(&c.key))
            }
            ReportRegistryCalls::users(c) => match self.users.get(&c.account) {
                Some(u) => usersCall::abi_encode_returns(&(
                    c.account,
                    u.name.clone(),
                    u.balance,
                    u.last_report,
                )),
                None => usersCall::abi_encode_returns(&(
                    Address::ZERO,
                    String::new(),
                    U256::ZERO,
                    U256::ZERO,
                )),
            },
            ReportRegistryCalls::delayFee(_) => delayFeeCall::abi_encode_returns(&(self.delay_fee,)),
            ReportRegistryCalls::maxDelay(_) => maxDelayCall::abi_encode_returns(&(self.max_delay,)),
            ReportRegistryCalls::admin(_) => adminCall::abi_encode_returns(&(self.admin,)),
            _ => Vec::new(),
        })
    }

    fn report_tuple(&self, key: &B256) -> (Address, bool, U256, U256, U256, String, U256) {
        match self.reports.get(key) {
            Some(r) => (
                r.sender,
                r.signed,
                r.ph,
                r.hardness,
                r.tds,
                r.company_name.clone(),
                r.timestamp,
            ),
            None => (
                Address::ZERO,
                false,
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                String::new(),
                U256::ZERO,
            ),
        }
    }

    /// Apply a transaction; `false` means it reverted.
    fn execute(&mut self, from: Address, value: U256, call: ReportRegistryCalls) -> bool {
        let now = U256::from(GENESIS_TIMESTAMP + self.block);

        match call {
            ReportRegistryCalls::newReport(c) => {
                let mut preimage = from.to_vec();
                preimage.extend_from_slice(&self.block.to_be_bytes());
                preimage.extend_from_slice(c.companyName.as_bytes());
                let key = keccak256(preimage);

                self.index.push(key);
                self.reports.insert(
                    key,
                    StoredReport {
                        sender: from,
                        signed: c.signed,
                        ph: c.ph,
                        hardness: c.hardness,
                        tds: c.tds,
                        company_name: c.companyName,
                        timestamp: now,
                    },
                );
                if let Some(user) = self.users.get_mut(&from) {
                    user.last_report = now;
                }
                true
            }
            ReportRegistryCalls::updateReport(c) => match self.reports.get_mut(&c.key) {
                Some(report) => {
                    report.signed = c.signed;
                    true
                }
                None => false,
            },
            ReportRegistryCalls::remReport(c) => {
                if self.reports.remove(&c.key).is_none() {
                    return false;
                }
                self.index.retain(|k| *k != c.key);
                true
            }
            ReportRegistryCalls::createUser(c) => {
                if self.users.contains_key(&from) {
                    return false;
                }
                self.users.insert(
                    from,
                    StoredUser {
                        name: c.name.clone(),
                        balance: U256::ZERO,
                        last_report: U256::ZERO,
                    },
                );
                let event = ReportRegistry::NewUser {
                    sender: from,
                    name: c.name,
                };
                self.logs.push(RawLog {
                    address: FakeRegistry::ADDRESS,
                    topics: vec![ReportRegistry::NewUser::SIGNATURE_HASH],
                    data: event.encode_data().into(),
                    block_number: Some(U64::from(self.block)),
                    log_index: Some(U64::ZERO),
                    transaction_hash: None,
                    removed: false,
                });
                true
            }
            ReportRegistryCalls::updateMaxDealy(c) if from == self.admin => {
                self.max_delay = c.delay;
                true
            }
            ReportRegistryCalls::updateFee(c) if from == self.admin => {
                self.delay_fee = c.fee;
                true
            }
            ReportRegistryCalls::changeAdmin(c) if from == self.admin => {
                self.admin = c.admin;
                true
            }
            ReportRegistryCalls::deposit(_) => match self.users.get_mut(&from) {
                Some(user) => {
                    user.balance += value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

#[async_trait]
impl Chain for FakeRegistry {
    async fn chain_id(&self) -> Result<u64> {
        Ok(Self::CHAIN_ID)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.state.lock().unwrap().selected.into_iter().collect())
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();

        if let Some(remaining) = state.calls_until_failure.as_mut() {
            if *remaining == 0 {
                return Err(AdminError::Transport("connection reset".to_string()));
            }
            *remaining -= 1;
        }
        if state.garbage_calls {
            return Ok(Bytes::from(vec![0x01, 0x02, 0x03]));
        }
        if request.to != Self::ADDRESS {
            return Ok(Bytes::new());
        }

        let call = ReportRegistryCalls::abi_decode(&request.data, true)?;
        Ok(state.answer(call)?.into())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256> {
        let mut state = self.state.lock().unwrap();

        if state.reject_next_send {
            state.reject_next_send = false;
            return Err(AdminError::Rejected(
                "eth_sendTransaction failed (4001): User rejected the request.".to_string(),
            ));
        }

        let from = request
            .from
            .ok_or_else(|| AdminError::Transport("missing from".to_string()))?;
        let call = ReportRegistryCalls::abi_decode(&request.data, true)?;
        state.sent.push(request.clone());

        let block = state.block;
        let ok = state.execute(from, request.value.unwrap_or_default(), call);
        let hash = keccak256(block.to_be_bytes());
        state.receipts.insert(
            hash,
            TransactionReceipt {
                transaction_hash: hash,
                block_number: Some(U64::from(block)),
                status: Some(if ok { U64::from(1) } else { U64::ZERO }),
            },
        );
        state.block += 1;
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        if state.receipt_delay > 0 {
            state.receipt_delay -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .logs
            .iter()
            .filter(|log| log.address == filter.address)
            .filter(|log| filter.topics.iter().all(|t| log.topics.contains(t)))
            .cloned()
            .collect())
    }
}
