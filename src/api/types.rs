use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::rpc::TokenHolder;

pub const DEFAULT_HOLDERS_LIMIT: usize = 10;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub address: String,
    /// Balance in SOL.
    pub balance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldersResponse {
    pub mint_address: String,
    pub holders: Vec<TokenHolder>,
}

/// Query string of `/api/performance`.
///
/// Both values are kept as raw strings: an unknown range falls back to `20m`
/// and a limit that is not a number falls back to 50, neither is rejected.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PerformanceQuery {
    /// One of `5m`, `20m`, `1h`, `6h`.
    pub time_range: Option<String>,
    /// Explicit sample count, capped at 360.
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HoldersQuery {
    /// Maximum number of holders, 10 when absent or not a number.
    pub limit: Option<String>,
}

impl HoldersQuery {
    pub fn resolved_limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_HOLDERS_LIMIT)
    }
}
