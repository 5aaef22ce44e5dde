//! Report data gateway: index walk for listing, single reads by key, and
//! one transaction per create/update/remove.

use std::sync::Arc;

use alloy_primitives::{B256, U256};
use tracing::{debug, info};

use crate::contract::ReportRegistry::{
    getReportAtIndexCall, getReportCall, getReportCountCall, newReportCall, remReportCall,
    reportsCall, updateReportCall,
};
use crate::errors::{AdminError, Result};
use crate::models::{DataResponse, NewReport, Report};
use crate::provider::ProviderAdapter;

#[derive(Clone)]
pub struct ReportGateway {
    provider: Arc<ProviderAdapter>,
}

impl ReportGateway {
    pub fn new(provider: Arc<ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Every report, in on-chain index order.
    ///
    /// One count read, then a key read and a record read per index, one
    /// after another. The first failing read fails the whole listing.
    pub async fn list_reports(&self) -> Result<DataResponse<Vec<Report>>> {
        let contract = self.provider.contract();
        let count = contract.read(getReportCountCall {}).await?.count;
        debug!(%count, "Walking report index");

        let mut reports = Vec::new();
        let mut index = U256::ZERO;
        while index < count {
            let key = contract.read(getReportAtIndexCall { index }).await?.key;
            let raw = contract.read(reportsCall { key }).await?;
            reports.push(Report::from_reports_call(key, raw)?);
            index += U256::from(1);
        }

        Ok(DataResponse::new(reports))
    }

    pub async fn get_report(&self, key: B256) -> Result<DataResponse<Report>> {
        let raw = self
            .provider
            .contract()
            .read(getReportCall { key })
            .await?;
        let report = Report::from_get_report_call(key, raw)?;
        if report.is_default_record() {
            return Err(AdminError::NotFound(format!("report {key}")));
        }
        Ok(DataResponse::new(report))
    }

    pub async fn create_report(&self, fields: NewReport) -> Result<DataResponse<bool>> {
        let from = self.provider.current_account().await?;
        let call = newReportCall {
            signed: fields.signed,
            ph: U256::from(fields.ph),
            hardness: U256::from(fields.hardness),
            tds: U256::from(fields.tds),
            companyName: fields.company_name,
        };
        self.provider.contract().write(from, call, None).await?;
        info!(%from, "Report created");
        Ok(DataResponse::new(true))
    }

    pub async fn update_report(&self, key: B256, signed: bool) -> Result<DataResponse<bool>> {
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(from, updateReportCall { key, signed }, None)
            .await?;
        info!(%key, signed, "Report updated");
        Ok(DataResponse::new(true))
    }

    pub async fn remove_report(&self, key: B256) -> Result<DataResponse<bool>> {
        let from = self.provider.current_account().await?;
        self.provider
            .contract()
            .write(from, remReportCall { key }, None)
            .await?;
        info!(%key, "Report removed");
        Ok(DataResponse::new(true))
    }
}
