//! Popbill API client configuration.
//!
//! Configures the API and token-issuing endpoints plus the partner
//! credential pair. Defaults point to production endpoints. Override via
//! environment variables or explicit construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the Popbill API.
///
/// Custom `Debug` implementation redacts the `secret_key` field to prevent
/// credential leakage in log output. The secret is placed on the wire only
/// during session-token acquisition, never on ordinary API calls.
#[derive(Clone)]
pub struct PopbillConfig {
    /// Base URL for the Popbill API.
    /// Default: <https://popbill.linkhub.co.kr>
    pub api_url: Url,
    /// Base URL for the token-issuing service.
    /// Default: <https://auth.linkhub.co.kr>
    pub auth_url: Url,
    /// Registered partner link ID.
    pub link_id: String,
    /// Partner secret key, used only to obtain session tokens.
    pub secret_key: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PopbillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopbillConfig")
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("link_id", &self.link_id)
            .field("secret_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PopbillConfig {
    /// Create a configuration with explicit endpoints and credentials.
    pub fn new(
        api_url: Url,
        auth_url: Url,
        link_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url,
            auth_url,
            link_id: link_id.into(),
            secret_key: Zeroizing::new(secret_key.into()),
            timeout_secs: 30,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `POPBILL_API_URL` (default: `https://popbill.linkhub.co.kr`)
    /// - `POPBILL_AUTH_URL` (default: `https://auth.linkhub.co.kr`)
    /// - `POPBILL_LINKID` (required)
    /// - `POPBILL_SECRETKEY` (required)
    /// - `POPBILL_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let link_id = std::env::var("POPBILL_LINKID").map_err(|_| ConfigError::MissingLinkId)?;
        let secret_key =
            std::env::var("POPBILL_SECRETKEY").map_err(|_| ConfigError::MissingSecretKey)?;

        Ok(Self {
            api_url: env_url("POPBILL_API_URL", "https://popbill.linkhub.co.kr")?,
            auth_url: env_url("POPBILL_AUTH_URL", "https://auth.linkhub.co.kr")?,
            link_id,
            secret_key: Zeroizing::new(secret_key),
            timeout_secs: std::env::var("POPBILL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("POPBILL_LINKID environment variable is required")]
    MissingLinkId,
    #[error("POPBILL_SECRETKEY environment variable is required")]
    MissingSecretKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_defaults_timeout() {
        let cfg = PopbillConfig::new(
            "http://127.0.0.1:9000".parse().unwrap(),
            "http://127.0.0.1:9001".parse().unwrap(),
            "TESTER",
            "secret",
        );
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.link_id, "TESTER");
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = PopbillConfig::new(
            "http://127.0.0.1:9000".parse().unwrap(),
            "http://127.0.0.1:9001".parse().unwrap(),
            "TESTER",
            "hunter2",
        );
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("NONEXISTENT_VAR_98765", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("TEST_BAD_URL_PB", "not a url");
        let result = env_url("TEST_BAD_URL_PB", "https://example.com");
        std::env::remove_var("TEST_BAD_URL_PB");
        assert!(result.is_err());
    }
}
