//! Settings gateway: contract parameters read in one sequential sweep and
//! written back one field per transaction.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::info;

use crate::contract::ReportRegistry::{
    adminCall, changeAdminCall, delayFeeCall, depositCall, maxDelayCall, updateFeeCall,
    updateMaxDealyCall, usersCall,
};
use crate::errors::{AdminError, Result};
use crate::models::{DataResponse, Settings};
use crate::provider::ProviderAdapter;
use crate::units::{self, NativeAmount, TimeUnit};

#[derive(Clone)]
pub struct SettingsGateway {
    provider: Arc<ProviderAdapter>,
}

impl SettingsGateway {
    pub fn new(provider: Arc<ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Balance of the current account, delay fee, max delay and admin, read
    /// in that order. Any failure aborts the remaining reads.
    pub async fn get_settings(&self) -> Result<DataResponse<Settings>> {
        let account = self.provider.current_account().await?;
        let contract = self.provider.contract();

        let balance = contract.read(usersCall { account }).await?.balance;
        let fee = contract.read(delayFeeCall {}).await?.fee;
        let delay = contract.read(maxDelayCall {}).await?.delay;
        let admin = contract.read(adminCall {}).await?.admin;

        if delay > U256::from(u64::MAX) {
            return Err(AdminError::Transport(format!(
                "contract returned maxDelay = {delay}, which does not fit in 64 bits"
            )));
        }

        Ok(DataResponse::new(Settings {
            account,
            balance: units::format_native(balance)?,
            balance_wei: balance,
            delay_fee: units::format_native(fee)?,
            delay_fee_wei: fee,
            max_delay: delay.to::<u64>(),
            admin,
        }))
    }

    /// Submit `value` expressed in `unit` as the new max delay, in seconds.
    /// Resolves to the canonical seconds value that was submitted.
    pub async fn update_delay(&self, value: u64, unit: TimeUnit) -> Result<DataResponse<u64>> {
        let seconds = unit.to_seconds(value)?;
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(
                from,
                updateMaxDealyCall {
                    delay: U256::from(seconds),
                },
                None,
            )
            .await?;
        info!(value, %unit, seconds, "Max delay updated");
        Ok(DataResponse::new(seconds))
    }

    /// Submit a new delay fee given in ether. Resolves to the wei amount.
    pub async fn update_fee(&self, value: &NativeAmount) -> Result<DataResponse<U256>> {
        let fee = value.to_wei()?;
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(from, updateFeeCall { fee }, None)
            .await?;
        info!(%fee, "Delay fee updated");
        Ok(DataResponse::new(fee))
    }

    pub async fn update_admin(&self, admin: Address) -> Result<DataResponse<Address>> {
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(from, changeAdminCall { admin }, None)
            .await?;
        info!(%admin, "Contract admin changed");
        Ok(DataResponse::new(admin))
    }

    /// Deposit `amount` ether from `account`, or from the current account
    /// when none is given. Resolves to the wei amount sent.
    pub async fn deposit(
        &self,
        amount: &NativeAmount,
        account: Option<Address>,
    ) -> Result<DataResponse<U256>> {
        let value = amount.to_wei()?;
        let from = match account {
            Some(account) => account,
            None => self.provider.current_account().await?,
        };
        self.provider
            .contract()
            .write(from, depositCall {}, Some(value))
            .await?;
        info!(%from, %value, "Deposit mined");
        Ok(DataResponse::new(value))
    }
}
