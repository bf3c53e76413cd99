//! Bank-account verification (scopes `182`, `183`).
//!
//! Two billable checks: account-name lookup (holder name for a bank code +
//! account number) and depositor-name verification (does a given personal
//! or business registration number own the account). Both are immediate
//! request/response calls with no job lifecycle.

use popbill_core::PartnerIdentity;
use reqwest::Method;
use serde::Deserialize;

use crate::charge::{ChargeInfo, UnitCostResponse};
use crate::error::PopbillError;
use crate::query::QueryBuilder;
use crate::transport::{Payload, Transport};

pub(crate) const SCOPES: &[&str] = &["182", "183"];

/// Kind of registration number presented for depositor verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityNumType {
    /// Personal registration number (`P`).
    Personal,
    /// Business registration number (`B`).
    Business,
}

impl IdentityNumType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "P",
            Self::Business => "B",
        }
    }
}

/// Result of an account-name lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCheckInfo {
    #[serde(default)]
    pub result_code: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub result_message: Option<String>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    /// Holder name as registered with the bank.
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub check_date: Option<String>,
    #[serde(rename = "checkDT", default)]
    pub check_dt: Option<String>,
}

/// Result of a depositor-name verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositorCheckInfo {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub result_message: Option<String>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub identity_num_type: Option<String>,
    #[serde(default)]
    pub identity_num: Option<String>,
    #[serde(default)]
    pub check_date: Option<String>,
    #[serde(rename = "checkDT", default)]
    pub check_dt: Option<String>,
}

/// Sub-client for bank-account verification.
pub struct AccountCheckClient {
    transport: Transport,
}

impl AccountCheckClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Look up the holder name of a bank account. Billable per call.
    pub async fn check_account_info(
        &self,
        identity: &PartnerIdentity,
        bank_code: &str,
        account_number: &str,
    ) -> Result<AccountCheckInfo, PopbillError> {
        require(bank_code, "BankCode", "bank institution code is required")?;
        require(account_number, "AccountNumber", "account number is required")?;

        let mut query = QueryBuilder::new();
        query.push("c", bank_code).push("n", account_number);
        let path = query.apply("EasyFin/AccountCheck");
        self.transport
            .request_json(Method::POST, &path, identity, Payload::None)
            .await
    }

    /// Verify that a registration number owns a bank account. Billable per
    /// call. `identity_num` must be all digits.
    pub async fn check_depositor_info(
        &self,
        identity: &PartnerIdentity,
        bank_code: &str,
        account_number: &str,
        identity_num_type: IdentityNumType,
        identity_num: &str,
    ) -> Result<DepositorCheckInfo, PopbillError> {
        require(bank_code, "BankCode", "bank institution code is required")?;
        require(account_number, "AccountNumber", "account number is required")?;
        require(identity_num, "IdentityNum", "registration number is required")?;
        if !identity_num.chars().all(|c| c.is_ascii_digit()) {
            return Err(PopbillError::Input {
                field: "IdentityNum",
                reason: "registration number must be digits only".into(),
            });
        }

        let mut query = QueryBuilder::new();
        query
            .push("c", bank_code)
            .push("n", account_number)
            .push("t", identity_num_type.as_str())
            .push("p", identity_num);
        let path = query.apply("EasyFin/DepositorCheck");
        self.transport
            .request_json(Method::POST, &path, identity, Payload::None)
            .await
    }

    /// Per-check cost for the given service type.
    pub async fn unit_cost(
        &self,
        identity: &PartnerIdentity,
        service_type: &str,
    ) -> Result<f64, PopbillError> {
        require(service_type, "ServiceType", "service type is required")?;
        let mut query = QueryBuilder::new();
        query.push("serviceType", service_type);
        let path = query.apply("EasyFin/AccountCheck/UnitCost");
        let resp: UnitCostResponse = self
            .transport
            .request_json(Method::GET, &path, identity, Payload::None)
            .await?;
        Ok(resp.unit_cost)
    }

    /// Billing terms for the given service type.
    pub async fn charge_info(
        &self,
        identity: &PartnerIdentity,
        service_type: &str,
    ) -> Result<ChargeInfo, PopbillError> {
        require(service_type, "ServiceType", "service type is required")?;
        let mut query = QueryBuilder::new();
        query.push("serviceType", service_type);
        let path = query.apply("EasyFin/AccountCheck/ChargeInfo");
        self.transport
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }
}

fn require(value: &str, field: &'static str, reason: &str) -> Result<(), PopbillError> {
    if value.is_empty() {
        return Err(PopbillError::Input {
            field,
            reason: reason.into(),
        });
    }
    Ok(())
}
