//! Error types for the RPC access layer.
//!
//! [`RpcError`] separates the failure modes a caller has to tell apart:
//!
//! - **Transport failures** ([`Transport`](RpcError::Transport),
//!   [`Json`](RpcError::Json)): the upstream could not be reached or answered
//!   with a body that is not a JSON-RPC envelope. These are retryable.
//! - **Upstream errors** ([`Rpc`](RpcError::Rpc)): the node answered with a
//!   JSON-RPC error object.
//! - **Shape errors** ([`InvalidResponse`](RpcError::InvalidResponse)): the
//!   envelope decoded but the result is missing fields the query needs.
//! - **Budget exhaustion** ([`MaxRetriesExceeded`](RpcError::MaxRetriesExceeded)).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// Network or IO failure talking to the upstream node.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream body was not a decodable JSON-RPC envelope.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The result payload did not have the shape the query expects.
    #[error("Invalid {0} response")]
    InvalidResponse(&'static str),

    /// Every attempt of the retrying caller was consumed without a returnable response.
    #[error("max retries exceeded")]
    MaxRetriesExceeded,
}

impl RpcError {
    /// Whether the retrying caller may try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::Json(_))
    }
}
