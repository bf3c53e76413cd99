//! Scoped HTTP transport shared by the feature sub-clients.
//!
//! One [`Transport`] per sub-client, carrying that module's [`ScopeSet`].
//! Every request resolves a bearer token for (identity, scopes), sends, and
//! on a `401 Unauthorized` invalidates the cached token and retries exactly
//! once with a fresh one. A second `401` surfaces as
//! [`PopbillError::Auth`]. No other status triggers a retry.

use std::sync::Arc;

use popbill_core::PartnerIdentity;
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{remote_error, PopbillError};
use crate::token::{ScopeSet, TokenManager};

/// Request body variants the Popbill API uses.
pub(crate) enum Payload<'a> {
    /// No body (GET, and POSTs that carry everything in the path).
    None,
    /// JSON body.
    Json(&'a serde_json::Value),
}

pub(crate) struct Transport {
    http: reqwest::Client,
    api_url: Url,
    tokens: Arc<TokenManager>,
    scopes: ScopeSet,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        api_url: Url,
        tokens: Arc<TokenManager>,
        scopes: ScopeSet,
    ) -> Self {
        Self {
            http,
            api_url,
            tokens,
            scopes,
        }
    }

    /// Send a request and return the raw success response.
    ///
    /// `path_and_query` is relative to the API base URL, without a leading
    /// slash. Handles the one-shot token refresh on `401`.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path_and_query: &str,
        identity: &PartnerIdentity,
        payload: Payload<'_>,
    ) -> Result<reqwest::Response, PopbillError> {
        let endpoint = endpoint_label(&method, path_and_query);
        let url = format!("{}{}", self.api_url, path_and_query);

        let mut refreshed = false;
        loop {
            let token = self.tokens.bearer(identity, &self.scopes).await?;

            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .header("Accept", "application/json");
            if let Some(user_id) = identity.user_id.as_deref() {
                request = request.header("x-pb-userid", user_id);
            }
            if let Payload::Json(body) = &payload {
                request = request.json(body);
            }

            let resp = request.send().await.map_err(|e| PopbillError::Transport {
                endpoint: endpoint.clone(),
                source: e,
            })?;

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                if !refreshed {
                    refreshed = true;
                    tracing::warn!(%endpoint, "session token rejected, refreshing once");
                    self.tokens.invalidate(identity, &self.scopes);
                    continue;
                }
                let body = resp.text().await.unwrap_or_default();
                return Err(PopbillError::Auth {
                    message: format!("{endpoint} rejected a freshly issued token: {body}"),
                });
            }

            if !status.is_success() {
                return Err(remote_error(&endpoint, resp).await);
            }

            tracing::debug!(%endpoint, status = status.as_u16(), "request succeeded");
            return Ok(resp);
        }
    }

    /// Send a request and decode the JSON success body into `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path_and_query: &str,
        identity: &PartnerIdentity,
        payload: Payload<'_>,
    ) -> Result<T, PopbillError> {
        let endpoint = endpoint_label(&method, path_and_query);
        let resp = self
            .execute(method, path_and_query, identity, payload)
            .await?;
        resp.json().await.map_err(|e| PopbillError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

fn endpoint_label(method: &Method, path_and_query: &str) -> String {
    // Query strings carry caller data; keep labels to the path alone.
    let path = path_and_query.split('?').next().unwrap_or(path_and_query);
    format!("{method} /{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_label_strips_query() {
        let label = endpoint_label(
            &Method::GET,
            "HomeTax/Cashbill/202501011234567890/State?TradeType=SELL",
        );
        assert_eq!(label, "GET /HomeTax/Cashbill/202501011234567890/State");
    }

    #[test]
    fn endpoint_label_without_query() {
        assert_eq!(endpoint_label(&Method::POST, "CloseDown"), "POST /CloseDown");
    }
}
