//! Popbill API client error types.
//!
//! One flat taxonomy for the whole client:
//!
//! - [`PopbillError::Input`] — a client-side precondition failed; raised
//!   before any network access and never retried.
//! - [`PopbillError::Auth`] — a session token could not be obtained, or the
//!   service rejected it twice in a row.
//! - [`PopbillError::Remote`] — the service reported a failure; the machine
//!   code and message from its error envelope are carried verbatim.
//! - [`PopbillError::Transport`] — connection/timeout failures below the
//!   HTTP layer, propagated unchanged.
//! - [`PopbillError::Decode`] — a success body that does not match the
//!   expected shape.

use popbill_core::ValidationError;
use serde::Deserialize;

/// Errors from Popbill API calls.
#[derive(Debug, thiserror::Error)]
pub enum PopbillError {
    /// A client-side precondition failed. No request was made.
    #[error("invalid input for {field}: {reason}")]
    Input {
        /// Name of the offending field.
        field: &'static str,
        reason: String,
    },

    /// Authentication failed after the one-shot token refresh.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The service returned a non-success status.
    #[error("Popbill API {endpoint} returned {status}: {message}")]
    Remote {
        endpoint: String,
        status: u16,
        /// Machine error code from the response envelope, when present.
        code: Option<i64>,
        message: String,
    },

    /// HTTP transport error (connection refused, timeout, TLS failure).
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Response body did not decode into the expected shape.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl From<ValidationError> for PopbillError {
    fn from(err: ValidationError) -> Self {
        Self::Input {
            field: err.field(),
            reason: err.to_string(),
        }
    }
}

/// In-body error envelope the service attaches to failed calls.
///
/// Distinct from any payload shape: a negative machine code plus a
/// human-readable message.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub code: i64,
    pub message: String,
}

/// Map a non-success response into a [`PopbillError::Remote`], pulling the
/// machine code and message out of the error envelope when the body carries
/// one. The envelope contents are passed through verbatim.
pub(crate) async fn remote_error(endpoint: &str, resp: reqwest::Response) -> PopbillError {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => PopbillError::Remote {
            endpoint: endpoint.to_string(),
            status,
            code: Some(envelope.code),
            message: envelope.message,
        },
        Err(_) => PopbillError::Remote {
            endpoint: endpoint.to_string(),
            status,
            code: None,
            message: body,
        },
    }
}
