//! Typed async client for the Popbill API.
//!
//! Covers the document-verification and tax-data aggregation services:
//! hometax cashbill and tax-invoice collection jobs, bank-account
//! verification, and corporate closedown checks. One [`PopbillClient`]
//! hands out per-feature sub-clients; each sub-client authenticates with
//! its own capability scopes and shares a process-wide session-token cache.
//!
//! All inputs are validated before any request is constructed; service
//! failures surface as [`PopbillError`] with the service's error code and
//! message carried verbatim. No call is ever retried, except a single
//! token-refresh replay after a `401`.
//!
//! ```no_run
//! use popbill_client::{PartnerIdentity, PopbillClient, PopbillConfig};
//! use popbill_client::hometax::cashbill::CashbillQueryType;
//!
//! # async fn run() -> Result<(), popbill_client::PopbillError> {
//! let client = PopbillClient::new(PopbillConfig::from_env()?)?;
//! let identity = PartnerIdentity::new("1234567890")?;
//!
//! let job_id = client
//!     .hometax_cashbill()
//!     .request_job(&identity, CashbillQueryType::Sell, "20250101", "20250131")
//!     .await?;
//!
//! let state = client.hometax_cashbill().job_state(&identity, &job_id).await?;
//! println!("job {} finished: {}", job_id, state.job_state.is_finished());
//! # Ok(())
//! # }
//! ```

pub mod accountcheck;
pub mod closedown;
pub mod hometax;

mod charge;
mod config;
mod error;
mod job;
mod query;
mod token;
mod transport;

use std::sync::Arc;
use std::time::Duration;

pub use popbill_core::{
    CorpNum, JobId, NtsConfirmNum, PartnerIdentity, ValidationError, Ymd,
};

pub use crate::charge::{ChargeInfo, FlatRateState};
pub use crate::config::{ConfigError, PopbillConfig};
pub use crate::error::PopbillError;
pub use crate::job::{JobState, JobStateCode, SearchResult, SortOrder};
pub use crate::token::ScopeSet;

use crate::accountcheck::AccountCheckClient;
use crate::closedown::ClosedownClient;
use crate::hometax::cashbill::HometaxCashbillClient;
use crate::hometax::taxinvoice::HometaxTaxinvoiceClient;
use crate::token::TokenManager;
use crate::transport::Transport;

/// Entry point: builds the shared HTTP client and token cache, hands out
/// the per-feature sub-clients.
pub struct PopbillClient {
    hometax_cashbill: HometaxCashbillClient,
    hometax_taxinvoice: HometaxTaxinvoiceClient,
    account_check: AccountCheckClient,
    closedown: ClosedownClient,
}

impl PopbillClient {
    /// Build a client from explicit configuration.
    pub fn new(config: PopbillConfig) -> Result<Self, PopbillError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PopbillError::Transport {
                endpoint: "client initialization".into(),
                source: e,
            })?;

        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            config.auth_url.clone(),
            config.link_id.clone(),
            config.secret_key.clone(),
        ));

        let transport = |scopes: &[&'static str]| {
            Transport::new(
                http.clone(),
                config.api_url.clone(),
                Arc::clone(&tokens),
                ScopeSet::new(scopes),
            )
        };

        Ok(Self {
            hometax_cashbill: HometaxCashbillClient::new(transport(hometax::cashbill::SCOPES)),
            hometax_taxinvoice: HometaxTaxinvoiceClient::new(transport(
                hometax::taxinvoice::SCOPES,
            )),
            account_check: AccountCheckClient::new(transport(accountcheck::SCOPES)),
            closedown: ClosedownClient::new(transport(closedown::SCOPES)),
        })
    }

    /// Build a client from `POPBILL_*` environment variables.
    pub fn from_env() -> Result<Self, PopbillError> {
        Self::new(PopbillConfig::from_env()?)
    }

    /// Hometax cashbill collection (scope `141`).
    pub fn hometax_cashbill(&self) -> &HometaxCashbillClient {
        &self.hometax_cashbill
    }

    /// Hometax tax-invoice collection (scope `111`).
    pub fn hometax_taxinvoice(&self) -> &HometaxTaxinvoiceClient {
        &self.hometax_taxinvoice
    }

    /// Bank-account verification (scopes `182`, `183`).
    pub fn account_check(&self) -> &AccountCheckClient {
        &self.account_check
    }

    /// Corporate closedown checks (scope `170`).
    pub fn closedown(&self) -> &ClosedownClient {
        &self.closedown
    }
}
