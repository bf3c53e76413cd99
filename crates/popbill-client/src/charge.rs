//! Billing and contract response types shared by the feature modules.

use serde::Deserialize;

/// Billing terms for one service module.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeInfo {
    #[serde(default)]
    pub unit_cost: Option<String>,
    #[serde(default)]
    pub charge_method: Option<String>,
    #[serde(default)]
    pub rate_system: Option<String>,
}

/// State of a module's flat-rate subscription contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRateState {
    #[serde(rename = "referenceID", default)]
    pub reference_id: Option<String>,
    #[serde(rename = "contractDT", default)]
    pub contract_dt: Option<String>,
    #[serde(default)]
    pub use_end_date: Option<String>,
    #[serde(default)]
    pub base_date: Option<i64>,
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(rename = "closeRequestYN", default)]
    pub close_request_yn: Option<bool>,
    #[serde(rename = "useRestrictYN", default)]
    pub use_restrict_yn: Option<bool>,
    #[serde(default)]
    pub close_on_expired: Option<bool>,
    #[serde(rename = "unPaidYN", default)]
    pub un_paid_yn: Option<bool>,
}

/// Per-item issue cost.
#[derive(Debug, Deserialize)]
pub(crate) struct UnitCostResponse {
    #[serde(rename = "unitCost")]
    pub unit_cost: f64,
}

/// Responses that carry a single member-page URL.
#[derive(Debug, Deserialize)]
pub(crate) struct UrlResponse {
    pub url: String,
}

/// Expiration timestamp of the registered hometax certificate.
#[derive(Debug, Deserialize)]
pub(crate) struct CertExpirationResponse {
    #[serde(rename = "certificateExpiration")]
    pub certificate_expiration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_info_tolerates_missing_fields() {
        let info: ChargeInfo = serde_json::from_str(r#"{"chargeMethod":"정액제"}"#).unwrap();
        assert_eq!(info.charge_method.as_deref(), Some("정액제"));
        assert!(info.unit_cost.is_none());
    }

    #[test]
    fn flat_rate_state_decodes() {
        let state: FlatRateState = serde_json::from_str(
            r#"{
                "referenceID": "1234567890",
                "contractDT": "20250101120000",
                "useEndDate": "20251231",
                "baseDate": 31,
                "state": 1,
                "closeRequestYN": false,
                "useRestrictYN": false,
                "closeOnExpired": true,
                "unPaidYN": false
            }"#,
        )
        .unwrap();
        assert_eq!(state.state, Some(1));
        assert_eq!(state.close_on_expired, Some(true));
    }

    #[test]
    fn unit_cost_decodes_number() {
        let cost: UnitCostResponse = serde_json::from_str(r#"{"unitCost":25.0}"#).unwrap();
        assert!((cost.unit_cost - 25.0).abs() < f64::EPSILON);
    }
}
