//! Hometax cashbill collection (scope `141`).
//!
//! Flow: [`HometaxCashbillClient::request_job`] queues collection of the
//! corporation's cashbill documents for a date range, returning a job ID.
//! Poll [`HometaxCashbillClient::job_state`] until
//! [`crate::JobStateCode::is_finished`], then page through
//! [`HometaxCashbillClient::search`] or roll up
//! [`HometaxCashbillClient::summary`]. Polling cadence is the caller's
//! concern; no method loops or sleeps.

use popbill_core::{JobId, NtsConfirmNum, PartnerIdentity, Ymd};
use reqwest::Method;
use serde::Deserialize;

use crate::charge::{ChargeInfo, FlatRateState};
use crate::error::PopbillError;
use crate::hometax::{self, HometaxResponse};
use crate::job::{JobLifecycle, JobState, SearchResult, SortOrder};
use crate::query::QueryBuilder;
use crate::transport::{Payload, Transport};

const BASE_PATH: &str = "HomeTax/Cashbill";

pub(crate) const SCOPES: &[&str] = &["141"];

/// Which side of the trade to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashbillQueryType {
    /// Cashbills the corporation issued.
    Sell,
    /// Cashbills issued to the corporation.
    Buy,
}

impl CashbillQueryType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sell => "SELL",
            Self::Buy => "BUY",
        }
    }
}

/// Trade kind filter for search/summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashbillTradeType {
    /// Approved trade.
    Approval,
    /// Cancelled trade.
    Cancel,
}

impl CashbillTradeType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Approval => "N",
            Self::Cancel => "C",
        }
    }
}

/// Trade usage filter for search/summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashbillTradeUsage {
    /// Issued for personal income deduction.
    IncomeDeduction,
    /// Issued as expense evidence.
    ExpenseEvidence,
}

impl CashbillTradeUsage {
    fn as_str(self) -> &'static str {
        match self {
            Self::IncomeDeduction => "P",
            Self::ExpenseEvidence => "C",
        }
    }
}

/// Filters and paging for [`HometaxCashbillClient::search`]. Empty filter
/// lists place no constraint (and emit no query parameter).
#[derive(Debug, Clone, Default)]
pub struct CashbillSearchOptions {
    pub trade_types: Vec<CashbillTradeType>,
    pub trade_usages: Vec<CashbillTradeUsage>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub order: Option<SortOrder>,
}

/// One collected cashbill document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cashbill {
    #[serde(rename = "ntsconfirmNum")]
    pub nts_confirm_num: NtsConfirmNum,
    #[serde(default)]
    pub trade_date: Option<String>,
    #[serde(rename = "tradeDT", default)]
    pub trade_dt: Option<String>,
    #[serde(default)]
    pub trade_usage: Option<String>,
    #[serde(default)]
    pub trade_type: Option<String>,
    #[serde(default)]
    pub supply_cost: Option<String>,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub service_fee: Option<String>,
    #[serde(default)]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub franchise_corp_num: Option<String>,
    #[serde(default)]
    pub franchise_corp_name: Option<String>,
    #[serde(default)]
    pub franchise_corp_type: Option<i32>,
    #[serde(default)]
    pub identity_num: Option<String>,
    #[serde(default)]
    pub identity_num_type: Option<i32>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub card_owner_name: Option<String>,
    #[serde(default)]
    pub deduction_type: Option<i32>,
    /// `1` for sales documents, `2` for purchases.
    #[serde(default)]
    pub invoice_type: Option<i32>,
}

/// Aggregate totals over a finished job's collected cashbills.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashbillSummary {
    pub count: i64,
    pub supply_cost_total: i64,
    pub tax_total: i64,
    pub service_fee_total: i64,
    pub amount_total: i64,
}

/// Sub-client for hometax cashbill collection.
pub struct HometaxCashbillClient {
    jobs: JobLifecycle,
}

impl HometaxCashbillClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self {
            jobs: JobLifecycle::new(transport, BASE_PATH),
        }
    }

    /// Queue a collection job for the date range (inclusive, `YYYYMMDD`).
    ///
    /// Not idempotent: every call queues a new job and is never retried.
    pub async fn request_job(
        &self,
        identity: &PartnerIdentity,
        query_type: CashbillQueryType,
        start_date: &str,
        end_date: &str,
    ) -> Result<JobId, PopbillError> {
        let start = date_field("SDate", start_date)?;
        let end = date_field("EDate", end_date)?;

        let mut query = QueryBuilder::new();
        query.push("SDate", start.as_str()).push("EDate", end.as_str());
        let path = query.apply(&format!("{}/{}", BASE_PATH, query_type.as_str()));
        self.jobs.request_job(identity, &path).await
    }

    /// Current state of one collection job. Single-shot; callers poll.
    pub async fn job_state(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
    ) -> Result<JobState, PopbillError> {
        self.jobs.job_state(identity, job_id).await
    }

    /// States of the identity's recent collection jobs.
    pub async fn list_active_jobs(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<Vec<JobState>, PopbillError> {
        self.jobs.list_jobs(identity).await
    }

    /// Page through a job's collected cashbills.
    ///
    /// Forwarded regardless of the job's local state; whatever the service
    /// reports for an unfinished job is surfaced untouched.
    pub async fn search(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
        options: &CashbillSearchOptions,
    ) -> Result<SearchResult<Cashbill>, PopbillError> {
        let mut query = QueryBuilder::new();
        query
            .push_list("TradeType", &codes(&options.trade_types, |t| t.as_str()))
            .push_list("TradeUsage", &codes(&options.trade_usages, |u| u.as_str()))
            .push_opt("Page", options.page.map(|p| p.to_string()).as_deref())
            .push_opt("PerPage", options.per_page.map(|p| p.to_string()).as_deref())
            .push_opt("Order", options.order.map(SortOrder::as_str));
        let path = query.apply(&format!("{}/{}", BASE_PATH, job_id));
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Aggregate totals over a job's collected cashbills.
    pub async fn summary(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
        trade_types: &[CashbillTradeType],
        trade_usages: &[CashbillTradeUsage],
    ) -> Result<CashbillSummary, PopbillError> {
        let mut query = QueryBuilder::new();
        query
            .push_list("TradeType", &codes(trade_types, |t| t.as_str()))
            .push_list("TradeUsage", &codes(trade_usages, |u| u.as_str()));
        let path = query.apply(&format!("{}/{}/Summary", BASE_PATH, job_id));
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    pub async fn charge_info(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<ChargeInfo, PopbillError> {
        hometax::charge_info(&self.jobs, identity).await
    }

    pub async fn flat_rate_state(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<FlatRateState, PopbillError> {
        hometax::flat_rate_state(&self.jobs, identity).await
    }

    pub async fn flat_rate_popup_url(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::flat_rate_popup_url(&self.jobs, identity).await
    }

    pub async fn certificate_popup_url(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::certificate_popup_url(&self.jobs, identity).await
    }

    pub async fn certificate_expiration(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::certificate_expiration(&self.jobs, identity).await
    }

    pub async fn check_cert_validation(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_cert_validation(&self.jobs, identity).await
    }

    pub async fn register_dept_user(
        &self,
        identity: &PartnerIdentity,
        dept_user_id: &str,
        dept_user_pwd: &str,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::register_dept_user(&self.jobs, identity, dept_user_id, dept_user_pwd).await
    }

    pub async fn check_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_dept_user(&self.jobs, identity).await
    }

    pub async fn check_login_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_login_dept_user(&self.jobs, identity).await
    }

    pub async fn delete_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::delete_dept_user(&self.jobs, identity).await
    }
}

fn date_field(field: &'static str, value: &str) -> Result<Ymd, PopbillError> {
    Ymd::new(value).map_err(|e| PopbillError::Input {
        field,
        reason: e.to_string(),
    })
}

fn codes<T: Copy>(values: &[T], f: impl Fn(T) -> &'static str) -> Vec<&'static str> {
    values.iter().map(|v| f(*v)).collect()
}
