use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use log::warn;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::rpc::SolanaRpcClient;

pub mod dashboard;
mod error;
pub mod types;

pub use error::ApiError;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard::api_health,
        dashboard::api_get_metrics,
        dashboard::api_get_performance,
        dashboard::api_get_account,
        dashboard::api_get_balance,
        dashboard::api_get_token,
        dashboard::api_get_token_holders,
    ),
    components(
        schemas(
            error::ApiError,
            types::HealthResponse,
            types::BalanceResponse,
            types::TokenHoldersResponse,
            crate::rpc::NetworkMetrics,
            crate::rpc::NetworkHealth,
            crate::rpc::metrics::ConnectionStatus,
            crate::rpc::PerformanceWindow,
            crate::rpc::PerformanceSample,
            crate::rpc::TimeRange,
            crate::rpc::AccountInfo,
            crate::rpc::TokenInfo,
            crate::rpc::TokenHolder,
            crate::rpc::TokenHolderBalance,
        )
    ),
    tags(
        (name = "solana-dashboard-proxy", description = "Solana dashboard API"),
    )
)]
pub struct ApiDoc;

/// Builds the CORS policy for the dashboard frontend.
///
/// A `*` entry opens the API to every origin, without credentials.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(CORS_MAX_AGE);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin.as_str(); "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}

pub fn create_router(client: SolanaRpcClient, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(dashboard::api_health))
        .route("/api/metrics", get(dashboard::api_get_metrics))
        .route("/api/performance", get(dashboard::api_get_performance))
        .route("/api/account/{address}", get(dashboard::api_get_account))
        .route("/api/balance/{address}", get(dashboard::api_get_balance))
        .route("/api/token/{mintAddress}", get(dashboard::api_get_token))
        .route("/api/token/{mintAddress}/holders", get(dashboard::api_get_token_holders))
        .layer(cors_layer(allowed_origins))
        .with_state(client)
}
