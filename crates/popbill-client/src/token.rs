//! Session-token acquisition and caching.
//!
//! Every Popbill call is authorized by a short-lived session token scoped
//! to the feature module's capability codes. Tokens are cached per
//! (corporation, acting sub-user, scope-set signature) — distinct modules
//! and identities never share a token. The partner secret is sent only to
//! the token-issuing endpoint, never on ordinary API calls.
//!
//! Concurrent callers hitting the same expired cache entry may each issue
//! a refresh; the refreshes are redundant but safe, and the lock is never
//! held across I/O.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use popbill_core::PartnerIdentity;
use serde::{Deserialize, Serialize};
use url::Url;
use zeroize::Zeroizing;

use crate::error::PopbillError;

/// Ordered, immutable set of capability codes a feature module declares at
/// construction. Fixed for the lifetime of a client instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSet(Vec<&'static str>);

impl ScopeSet {
    pub fn new(codes: &[&'static str]) -> Self {
        Self(codes.to_vec())
    }

    /// The scope codes in declaration order.
    pub fn codes(&self) -> &[&'static str] {
        &self.0
    }

    /// Stable signature used as part of the token cache key.
    pub fn signature(&self) -> String {
        self.0.join(",")
    }
}

/// Token cache key: one entry per (corporation, sub-user, scope set).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenKey {
    corp_num: String,
    user_id: Option<String>,
    scope_signature: String,
}

impl TokenKey {
    fn new(identity: &PartnerIdentity, scopes: &ScopeSet) -> Self {
        Self {
            corp_num: identity.corp_num.as_str().to_string(),
            user_id: identity.user_id.clone(),
            scope_signature: scopes.signature(),
        }
    }
}

/// A cached session token. Never exposed to callers of the client.
#[derive(Debug, Clone)]
struct SessionToken {
    token: String,
    expiration: DateTime<Utc>,
}

impl SessionToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// Wire request for token acquisition.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "linkID")]
    link_id: &'a str,
    #[serde(rename = "accessID")]
    access_id: &'a str,
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    scope: Vec<&'static str>,
}

/// Wire response from the token-issuing endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    session_token: String,
    expiration: DateTime<Utc>,
}

/// Obtains, caches, and invalidates session tokens.
///
/// Shared by all feature sub-clients of one [`crate::PopbillClient`]; each
/// sub-client resolves tokens against its own [`ScopeSet`], so cache
/// entries stay independent.
pub(crate) struct TokenManager {
    http: reqwest::Client,
    auth_url: Url,
    link_id: String,
    secret_key: Zeroizing<String>,
    cache: RwLock<HashMap<TokenKey, SessionToken>>,
}

impl TokenManager {
    pub(crate) fn new(
        http: reqwest::Client,
        auth_url: Url,
        link_id: String,
        secret_key: Zeroizing<String>,
    ) -> Self {
        Self {
            http,
            auth_url,
            link_id,
            secret_key,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a bearer token for the identity/scope pair, acquiring a new
    /// one when the cache has no live entry.
    pub(crate) async fn bearer(
        &self,
        identity: &PartnerIdentity,
        scopes: &ScopeSet,
    ) -> Result<String, PopbillError> {
        let key = TokenKey::new(identity, scopes);
        let now = Utc::now();

        if let Some(cached) = self.cache.read().get(&key) {
            if !cached.is_expired(now) {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.acquire(identity, scopes).await?;
        let token = fresh.token.clone();
        // Concurrent refreshes for the same key race here; last writer wins.
        self.cache.write().insert(key, fresh);
        Ok(token)
    }

    /// Drop the cached token for this identity/scope pair, forcing the next
    /// [`Self::bearer`] call to acquire a fresh one.
    pub(crate) fn invalidate(&self, identity: &PartnerIdentity, scopes: &ScopeSet) {
        let key = TokenKey::new(identity, scopes);
        self.cache.write().remove(&key);
    }

    async fn acquire(
        &self,
        identity: &PartnerIdentity,
        scopes: &ScopeSet,
    ) -> Result<SessionToken, PopbillError> {
        let url = format!("{}Token", self.auth_url);
        let request = TokenRequest {
            link_id: &self.link_id,
            access_id: identity.corp_num.as_str(),
            user_id: identity.user_id.as_deref(),
            scope: scopes.codes().to_vec(),
        };

        tracing::debug!(
            corp_num = %identity.corp_num,
            scopes = %scopes.signature(),
            "acquiring session token"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.secret_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| PopbillError::Transport {
                endpoint: "POST /Token".into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PopbillError::Auth {
                message: format!("token request returned {status}: {body}"),
            });
        }

        let token: TokenResponse =
            resp.json().await.map_err(|e| PopbillError::Decode {
                endpoint: "POST /Token".into(),
                reason: e.to_string(),
            })?;

        Ok(SessionToken {
            token: token.session_token,
            expiration: token.expiration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_set_signature_is_ordered() {
        let scopes = ScopeSet::new(&["182", "183"]);
        assert_eq!(scopes.signature(), "182,183");
        assert_eq!(scopes.codes(), &["182", "183"]);
    }

    #[test]
    fn token_keys_differ_by_scope_set() {
        let identity = PartnerIdentity::new("1234567890").unwrap();
        let a = TokenKey::new(&identity, &ScopeSet::new(&["141"]));
        let b = TokenKey::new(&identity, &ScopeSet::new(&["111"]));
        assert_ne!(a, b);
    }

    #[test]
    fn token_keys_differ_by_sub_user() {
        let scopes = ScopeSet::new(&["170"]);
        let plain = PartnerIdentity::new("1234567890").unwrap();
        let acting = plain.clone().with_user_id("worker01");
        assert_ne!(TokenKey::new(&plain, &scopes), TokenKey::new(&acting, &scopes));
    }

    #[test]
    fn expired_token_is_detected() {
        let token = SessionToken {
            token: "t".into(),
            expiration: Utc::now() - chrono::Duration::seconds(1),
        };
        assert!(token.is_expired(Utc::now()));
    }

    #[test]
    fn token_request_omits_absent_user_id() {
        let request = TokenRequest {
            link_id: "TESTER",
            access_id: "1234567890",
            user_id: None,
            scope: vec!["141"],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("userID"));
        assert!(json.contains("\"scope\":[\"141\"]"));
    }
}
