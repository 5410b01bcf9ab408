use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::rpc::{MetricsError, RpcError};

#[derive(Debug, Error, ToSchema)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// An upstream read failed. The message is what the client sees; the cause is only logged.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ApiError {
    /// Maps an access-layer failure to a client-facing message, logging the cause.
    pub fn upstream(message: &str) -> impl FnOnce(RpcError) -> Self + '_ {
        move |e| {
            error!(error:% = e; "{}", message);
            ApiError::Upstream(message.to_string())
        }
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        error!(error:% = err.source; "Failed to get {}", err.stage);
        ApiError::Upstream(format!("Failed to get {}", err.stage))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
