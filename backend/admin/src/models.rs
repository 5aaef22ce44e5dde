//! Records returned by the gateways, shaped the way the admin UI reads them.

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::ReportRegistry;
use crate::errors::{AdminError, Result};
use crate::units::{self, NativeAmount, TimeUnit};

/// Envelope every gateway operation resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A signed water-quality report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub key: B256,
    /// Account that issued the report.
    #[serde(rename = "sender")]
    pub issuer: Address,
    pub ph: u64,
    pub hardness: u64,
    pub tds: u64,
    pub company_name: String,
    pub signed: bool,
    pub timestamp: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn from_reports_call(key: B256, raw: ReportRegistry::reportsReturn) -> Result<Self> {
        Self::build(
            key,
            raw.sender,
            raw.signed,
            [raw.ph, raw.hardness, raw.tds, raw.timestamp],
            raw.companyName,
        )
    }

    pub fn from_get_report_call(key: B256, raw: ReportRegistry::getReportReturn) -> Result<Self> {
        Self::build(
            key,
            raw.sender,
            raw.signed,
            [raw.ph, raw.hardness, raw.tds, raw.timestamp],
            raw.companyName,
        )
    }

    fn build(
        key: B256,
        issuer: Address,
        signed: bool,
        [ph, hardness, tds, timestamp]: [U256; 4],
        company_name: String,
    ) -> Result<Self> {
        let timestamp = narrow(timestamp, "timestamp")?;
        Ok(Report {
            key,
            issuer,
            ph: narrow(ph, "ph")?,
            hardness: narrow(hardness, "hardness")?,
            tds: narrow(tds, "tds")?,
            company_name,
            signed,
            timestamp,
            created_at: to_datetime(timestamp),
        })
    }

    /// The registry never stores a report without an issuer; an all-default
    /// record is what the contract hands back for a key it does not know.
    pub fn is_default_record(&self) -> bool {
        self.issuer == Address::ZERO
    }
}

/// Fields submitted when creating a report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(deserialize_with = "units::deserialize_integer")]
    pub ph: u64,
    #[serde(deserialize_with = "units::deserialize_integer")]
    pub hardness: u64,
    #[serde(deserialize_with = "units::deserialize_integer")]
    pub tds: u64,
    pub company_name: String,
    #[serde(default)]
    pub signed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportUpdate {
    pub signed: bool,
}

/// A registered user, straight from the `users` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account: Address,
    pub name: String,
    /// Balance in wei.
    #[serde(serialize_with = "units::serialize_decimal")]
    pub balance: U256,
    pub last_report: u64,
    pub last_report_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_call(raw: ReportRegistry::usersReturn) -> Result<Self> {
        let last_report = narrow(raw.lastReport, "lastReport")?;
        Ok(User {
            account: raw.account,
            name: raw.name,
            balance: raw.balance,
            last_report,
            last_report_at: to_datetime(last_report),
        })
    }
}

/// One `NewUser` event: who registered and under which name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListing {
    pub sender: Address,
    pub name: String,
}

impl From<ReportRegistry::NewUser> for UserListing {
    fn from(ev: ReportRegistry::NewUser) -> Self {
        UserListing {
            sender: ev.sender,
            name: ev.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
}

/// Contract-level parameters plus the current account's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub account: Address,
    /// Current account balance, in ether.
    pub balance: String,
    #[serde(serialize_with = "units::serialize_decimal")]
    pub balance_wei: U256,
    /// Delay fee, in ether.
    pub delay_fee: String,
    #[serde(serialize_with = "units::serialize_decimal")]
    pub delay_fee_wei: U256,
    /// Maximum delay, in seconds.
    pub max_delay: u64,
    pub admin: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DelayUpdate {
    #[serde(deserialize_with = "units::deserialize_integer")]
    pub value: u64,
    pub unit: String,
}

impl DelayUpdate {
    pub fn unit(&self) -> Result<TimeUnit> {
        self.unit.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeeUpdate {
    pub value: NativeAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminUpdate {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepositRequest {
    pub amount: NativeAmount,
    #[serde(default)]
    pub account: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────

pub fn parse_key(raw: &str) -> Result<B256> {
    raw.trim()
        .parse()
        .map_err(|_| AdminError::Input(format!("'{raw}' is not a 32-byte report key")))
}

pub fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|_| AdminError::Input(format!("'{raw}' is not an address")))
}

fn narrow(value: U256, field: &str) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(AdminError::Transport(format!(
            "contract returned {field} = {value}, which does not fit in 64 bits"
        )));
    }
    Ok(value.to::<u64>())
}

fn to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
}
