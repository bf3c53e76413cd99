//! Hometax collection modules.
//!
//! Cashbill and tax-invoice collection share the job protocol ([`crate::job`])
//! and a set of account-management endpoints that differ only in base path:
//! billing info, flat-rate contract, hometax certificate management, and the
//! department-user account used for collection. Those shared operations live
//! here; each sub-client re-exposes them under its own path.

pub mod cashbill;
pub mod taxinvoice;

use popbill_core::PartnerIdentity;
use reqwest::Method;
use serde::Deserialize;

use crate::charge::{CertExpirationResponse, ChargeInfo, FlatRateState, UrlResponse};
use crate::error::PopbillError;
use crate::job::JobLifecycle;
use crate::transport::Payload;

/// Plain code/message acknowledgment returned by the certificate and
/// department-user endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct HometaxResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) async fn charge_info(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<ChargeInfo, PopbillError> {
    let path = format!("{}/ChargeInfo", jobs.base_path());
    jobs.transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await
}

pub(crate) async fn flat_rate_state(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<FlatRateState, PopbillError> {
    let path = format!("{}/Contract", jobs.base_path());
    jobs.transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await
}

pub(crate) async fn flat_rate_popup_url(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<String, PopbillError> {
    member_page_url(jobs, identity, "CHRG").await
}

pub(crate) async fn certificate_popup_url(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<String, PopbillError> {
    member_page_url(jobs, identity, "CERT").await
}

async fn member_page_url(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
    target: &str,
) -> Result<String, PopbillError> {
    let path = format!("{}?TG={}", jobs.base_path(), target);
    let resp: UrlResponse = jobs
        .transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await?;
    Ok(resp.url)
}

pub(crate) async fn certificate_expiration(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<String, PopbillError> {
    let path = format!("{}/CertInfo", jobs.base_path());
    let resp: CertExpirationResponse = jobs
        .transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await?;
    Ok(resp.certificate_expiration)
}

/// Attempt a hometax login with the registered certificate.
pub(crate) async fn check_cert_validation(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<HometaxResponse, PopbillError> {
    let path = format!("{}/CertCheck", jobs.base_path());
    jobs.transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await
}

pub(crate) async fn register_dept_user(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
    dept_user_id: &str,
    dept_user_pwd: &str,
) -> Result<HometaxResponse, PopbillError> {
    if dept_user_id.is_empty() {
        return Err(PopbillError::Input {
            field: "DeptUserID",
            reason: "department-user ID is required".into(),
        });
    }
    if dept_user_pwd.is_empty() {
        return Err(PopbillError::Input {
            field: "DeptUserPWD",
            reason: "department-user password is required".into(),
        });
    }
    let body = serde_json::json!({ "id": dept_user_id, "pwd": dept_user_pwd });
    let path = format!("{}/DeptUser", jobs.base_path());
    jobs.transport()
        .request_json(Method::POST, &path, identity, Payload::Json(&body))
        .await
}

pub(crate) async fn check_dept_user(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<HometaxResponse, PopbillError> {
    let path = format!("{}/DeptUser", jobs.base_path());
    jobs.transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await
}

/// Attempt a hometax login with the registered department-user account.
pub(crate) async fn check_login_dept_user(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<HometaxResponse, PopbillError> {
    let path = format!("{}/DeptUser/Check", jobs.base_path());
    jobs.transport()
        .request_json(Method::GET, &path, identity, Payload::None)
        .await
}

pub(crate) async fn delete_dept_user(
    jobs: &JobLifecycle,
    identity: &PartnerIdentity,
) -> Result<HometaxResponse, PopbillError> {
    let path = format!("{}/DeptUser", jobs.base_path());
    jobs.transport()
        .request_json(Method::DELETE, &path, identity, Payload::None)
        .await
}
