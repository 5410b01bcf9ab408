use std::time::Duration;

use log::{debug, warn};
use reqwest::{StatusCode, header::RETRY_AFTER};
use serde_json::Value;
use url::Url;

use super::{
    error::RpcError,
    types::{JsonRpcRequest, RpcErrorObject, RpcResponse, THROTTLED_CODE},
};

/// Single-shot JSON-RPC 2.0 transport over HTTP POST.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, RpcError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint,
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one request and decodes the envelope.
    ///
    /// A 429 status is not an error here: its body is decoded like any other,
    /// and the raw `Retry-After` header is attached to the error object for the
    /// retrying caller.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<RpcResponse, RpcError> {
        let request = JsonRpcRequest::new(method, params);
        debug!(method = method; "RPC: Dispatching request");

        let resp = self.client.post(self.endpoint.clone()).json(&request).send().await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            log_throttled(method, retry_after.as_deref());

            let body = resp.bytes().await?;
            let mut response = serde_json::from_slice::<RpcResponse>(&body).unwrap_or_else(|_| {
                RpcResponse::Failure(RpcErrorObject {
                    code: THROTTLED_CODE,
                    message: StatusCode::TOO_MANY_REQUESTS.to_string(),
                    data: None,
                    retry_after: None,
                })
            });
            if let Some(raw) = &retry_after {
                response.annotate_retry_after(raw);
            }
            return Ok(response);
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn log_throttled(method: &str, retry_after: Option<&str>) {
    match retry_after {
        Some(raw) => warn!(method = method, retry_after = raw; "Rate limited by upstream"),
        None => warn!(method = method; "Rate limited by upstream, no Retry-After header"),
    }
}
