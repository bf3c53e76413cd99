//! Corporate closedown (business-registration state) checks (scope `170`).
//!
//! Single-target checks go over GET; bulk checks POST the target list as a
//! JSON array. Both are billable per target.

use popbill_core::{CorpNum, PartnerIdentity};
use reqwest::Method;
use serde::Deserialize;

use crate::charge::{ChargeInfo, UnitCostResponse};
use crate::error::PopbillError;
use crate::query::QueryBuilder;
use crate::transport::{Payload, Transport};

pub(crate) const SCOPES: &[&str] = &["170"];

/// Registration state of one checked business number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpState {
    #[serde(default)]
    pub corp_num: Option<String>,
    /// `0` unregistered, `1` active, `2` suspended, `3` closed.
    #[serde(default)]
    pub state: Option<String>,
    /// `1` general, `2` tax-exempt, `3` non-profit.
    #[serde(rename = "type", default)]
    pub corp_type: Option<String>,
    #[serde(default)]
    pub tax_type: Option<String>,
    /// Date the state took effect.
    #[serde(default)]
    pub state_date: Option<String>,
    /// Date the NTS data was current as of.
    #[serde(default)]
    pub check_date: Option<String>,
    #[serde(default)]
    pub type_date: Option<String>,
}

/// Sub-client for closedown checks.
pub struct ClosedownClient {
    transport: Transport,
}

impl ClosedownClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Check the registration state of one business number.
    pub async fn check_corp_num(
        &self,
        identity: &PartnerIdentity,
        target_corp_num: &str,
    ) -> Result<CorpState, PopbillError> {
        let target = CorpNum::new(target_corp_num)?;
        let mut query = QueryBuilder::new();
        query.push("CN", target.as_str());
        let path = query.apply("CloseDown");
        self.transport
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Check a batch of business numbers in one call. Results come back in
    /// request order. Every target is validated before any network access.
    pub async fn check_corp_nums(
        &self,
        identity: &PartnerIdentity,
        target_corp_nums: &[&str],
    ) -> Result<Vec<CorpState>, PopbillError> {
        if target_corp_nums.is_empty() {
            return Err(PopbillError::Input {
                field: "CorpNumList",
                reason: "at least one business number is required".into(),
            });
        }
        let targets = target_corp_nums
            .iter()
            .map(|raw| CorpNum::new(*raw).map(|c| c.as_str().to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        let body = serde_json::json!(targets);
        self.transport
            .request_json(Method::POST, "CloseDown", identity, Payload::Json(&body))
            .await
    }

    /// Per-check cost.
    pub async fn unit_cost(&self, identity: &PartnerIdentity) -> Result<f64, PopbillError> {
        let resp: UnitCostResponse = self
            .transport
            .request_json(Method::GET, "CloseDown/UnitCost", identity, Payload::None)
            .await?;
        Ok(resp.unit_cost)
    }

    /// Billing terms for closedown checks.
    pub async fn charge_info(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<ChargeInfo, PopbillError> {
        self.transport
            .request_json(Method::GET, "CloseDown/ChargeInfo", identity, Payload::None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corp_state_decodes_active_business() {
        let state: CorpState = serde_json::from_str(
            r#"{"corpNum":"1234567890","state":"1","type":"1","stateDate":null,"checkDate":"20250115"}"#,
        )
        .unwrap();
        assert_eq!(state.state.as_deref(), Some("1"));
        assert!(state.state_date.is_none());
        assert_eq!(state.check_date.as_deref(), Some("20250115"));
    }

    #[test]
    fn corp_state_decodes_sparse_body() {
        let state: CorpState = serde_json::from_str(r#"{"corpNum":"1234567890"}"#).unwrap();
        assert!(state.state.is_none());
        assert!(state.corp_type.is_none());
    }
}
