//! Dashboard endpoint handlers.
//!
//! Thin translations from HTTP requests to [`SolanaRpcClient`] queries. Lookups
//! of unknown accounts or mints answer 200 with an object whose `isValid` is
//! `false`; only failures to reach the upstream become error responses.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Liveness probe |
//! | GET | `/api/metrics` | Network metrics snapshot |
//! | GET | `/api/performance` | Recent performance samples for a time range |
//! | GET | `/api/account/{address}` | Account details |
//! | GET | `/api/balance/{address}` | SOL balance |
//! | GET | `/api/token/{mintAddress}` | Token supply |
//! | GET | `/api/token/{mintAddress}/holders` | Largest token holders |

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use log::info;

use super::{
    error::ApiError,
    types::{BalanceResponse, HealthResponse, HoldersQuery, PerformanceQuery, TokenHoldersResponse},
};
use crate::{
    log::mask_string,
    rpc::{AccountInfo, NetworkMetrics, PerformanceWindow, SolanaRpcClient, TimeRange, TokenInfo},
};

fn require(value: String, message: &str) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(message.to_string()));
    }
    Ok(value)
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// Current network metrics, assembled from several upstream reads.
#[utoipa::path(
    get,
    path = "/api/metrics",
    responses(
        (status = 200, description = "Metrics snapshot", body = NetworkMetrics),
        (status = 500, description = "An upstream read failed", body = ApiError),
    )
)]
pub async fn api_get_metrics(State(client): State<SolanaRpcClient>) -> Result<Json<NetworkMetrics>, ApiError> {
    let metrics = client.network_metrics().await?;
    Ok(Json(metrics))
}

/// Performance samples for a dashboard chart, oldest first.
///
/// Responses are cached per range and limit; `cached` tells whether this one was.
#[utoipa::path(
    get,
    path = "/api/performance",
    params(PerformanceQuery),
    responses(
        (status = 200, description = "Performance window", body = PerformanceWindow),
        (status = 500, description = "Upstream read failed", body = ApiError),
    )
)]
pub async fn api_get_performance(
    State(client): State<SolanaRpcClient>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<PerformanceWindow>, ApiError> {
    let time_range = TimeRange::parse_or_default(query.time_range.as_deref());
    let window = client
        .get_performance_window(time_range, query.limit.as_deref())
        .await
        .map_err(ApiError::upstream("Failed to get performance samples"))?;
    Ok(Json(window))
}

#[utoipa::path(
    get,
    path = "/api/account/{address}",
    responses(
        (status = 200, description = "Account details, isValid=false when the account does not exist", body = AccountInfo),
        (status = 400, description = "Missing address", body = ApiError),
        (status = 500, description = "Upstream unreachable", body = ApiError),
    ),
    params(
        ("address" = String, Path, description = "Base58 account address"),
    )
)]
pub async fn api_get_account(
    State(client): State<SolanaRpcClient>,
    Path(address): Path<String>,
) -> Result<Json<AccountInfo>, ApiError> {
    let address = require(address, "Address parameter is required")?;
    let info = client
        .get_account_info(&address)
        .await
        .map_err(ApiError::upstream("Failed to get account info"))?;
    Ok(Json(info))
}

#[utoipa::path(
    get,
    path = "/api/balance/{address}",
    responses(
        (status = 200, description = "Balance in SOL", body = BalanceResponse),
        (status = 400, description = "Missing address", body = ApiError),
        (status = 500, description = "Upstream read failed", body = ApiError),
    ),
    params(
        ("address" = String, Path, description = "Base58 account address"),
    )
)]
pub async fn api_get_balance(
    State(client): State<SolanaRpcClient>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = require(address, "Address parameter is required")?;
    let balance = client
        .get_balance(&address)
        .await
        .map_err(ApiError::upstream("Failed to get balance"))?;
    Ok(Json(BalanceResponse { address, balance }))
}

#[utoipa::path(
    get,
    path = "/api/token/{mintAddress}",
    responses(
        (status = 200, description = "Token supply, isValid=false when the mint does not exist", body = TokenInfo),
        (status = 400, description = "Missing mint address", body = ApiError),
        (status = 500, description = "Upstream unreachable", body = ApiError),
    ),
    params(
        ("mintAddress" = String, Path, description = "Base58 mint address"),
    )
)]
pub async fn api_get_token(
    State(client): State<SolanaRpcClient>,
    Path(mint_address): Path<String>,
) -> Result<Json<TokenInfo>, ApiError> {
    let mint_address = require(mint_address, "Mint address parameter is required")?;
    let token = client
        .get_token_supply(&mint_address)
        .await
        .map_err(ApiError::upstream("Failed to get token info"))?;
    Ok(Json(token))
}

/// Largest holders of a token.
///
/// Never fails on upstream trouble: throttling and errors produce an empty list.
#[utoipa::path(
    get,
    path = "/api/token/{mintAddress}/holders",
    responses(
        (status = 200, description = "Largest holders", body = TokenHoldersResponse),
        (status = 400, description = "Missing mint address", body = ApiError),
    ),
    params(
        ("mintAddress" = String, Path, description = "Base58 mint address"),
        HoldersQuery,
    )
)]
pub async fn api_get_token_holders(
    State(client): State<SolanaRpcClient>,
    Path(mint_address): Path<String>,
    Query(query): Query<HoldersQuery>,
) -> Result<Json<TokenHoldersResponse>, ApiError> {
    let mint_address = require(mint_address, "Mint address parameter is required")?;
    let limit = query.resolved_limit();

    info!(mint = &*mask_string(&mint_address), limit = limit; "Fetching token holders");
    let holders = client.get_token_holders(&mint_address, limit).await;
    info!(count = holders.len(); "Found token holders");

    Ok(Json(TokenHoldersResponse { mint_address, holders }))
}
