//! The Solana RPC access layer.
//!
//! [`SolanaRpcClient`] owns everything shared between concurrent dashboard
//! requests: the transport, the per-method rate-limit ledger, the query cache
//! and the block-time estimator. Cloning the client clones a handle; all clones
//! share that state.
//!
//! # Retrying caller
//!
//! [`SolanaRpcClient::call_with_retry`] makes up to
//! [`RpcClientConfig::max_attempts`] attempts:
//!
//! - if the method was dispatched within the rate-limit interval, it sleeps the
//!   cooldown and tries the same attempt again;
//! - a transport failure backs off `base_delay * 2^attempt`, and the last one
//!   is returned as the error;
//! - a JSON-RPC 429 waits for the server's `Retry-After` hint when it parses,
//!   otherwise `base_delay * 2^(attempt + 1)`. The last 429 is returned as a
//!   response, not an error;
//! - anything else is returned as is.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::log::mask_string;

use super::{
    block_time::{BlockTimeConfig, BlockTimeEstimator},
    cache::TtlCache,
    error::RpcError,
    metrics::{MetricsError, MetricsInputs, NetworkMetrics, lamports_to_sol, scale_token_amount},
    performance::{self, METRICS_SAMPLE_LIMIT, PerformanceWindow, TimeRange},
    rate_limiter::{DEFAULT_RATE_LIMIT_INTERVAL, RateLimiter},
    retry_after::{MAX_RETRY_AFTER, parse_retry_after},
    transport::HttpTransport,
    types::{
        AccountInfo, EpochInfo, PerformanceSample, RpcResponse, TokenHolder, TokenHolderBalance, TokenInfo,
        UiAccount, UiTokenAmount, VoteAccounts, WithContext,
    },
};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

const TOKEN_HOLDERS_TTL: Duration = Duration::from_secs(5 * 60);
const LARGEST_ACCOUNTS_METHOD: &str = "getTokenLargestAccounts";

#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Attempts made by the retrying caller, first try included.
    pub max_attempts: u32,
    /// Unit of the exponential backoff.
    pub base_delay: Duration,
    /// Minimum gap between two dispatches of the same method.
    pub rate_limit_interval: Duration,
    /// Sleep when a dispatch is refused by the rate limiter.
    pub rate_limit_cooldown: Duration,
    /// Longest wait accepted from a `Retry-After` hint.
    pub max_retry_after: Duration,
    /// Per-request HTTP timeout. `None` leaves latency bounded only by the retry budget.
    pub http_timeout: Option<Duration>,
    pub block_time: BlockTimeConfig,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_interval: DEFAULT_RATE_LIMIT_INTERVAL,
            rate_limit_cooldown: Duration::from_secs(2),
            max_retry_after: MAX_RETRY_AFTER,
            http_timeout: None,
            block_time: BlockTimeConfig::default(),
        }
    }
}

/// Values memoized by the client, keyed by logical query.
#[derive(Debug, Clone)]
enum CachedQuery {
    TokenHolders(Vec<TokenHolder>),
    PerformanceSamples(Vec<PerformanceSample>),
}

struct ClientInner {
    transport: HttpTransport,
    rate_limiter: RateLimiter,
    cache: TtlCache<CachedQuery>,
    block_time: BlockTimeEstimator,
    config: RpcClientConfig,
}

#[derive(Clone)]
pub struct SolanaRpcClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for SolanaRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcClient")
            .field("endpoint", &self.inner.transport.endpoint().as_str())
            .finish_non_exhaustive()
    }
}

/// `base * 2^exponent`, saturating.
pub fn backoff_delay(base: Duration, exponent: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(exponent))
}

pub(crate) async fn fetch_slot(transport: &HttpTransport) -> Result<u64, RpcError> {
    let result = success_payload(transport.call("getSlot", &[]).await?)?;
    result.as_u64().ok_or(RpcError::InvalidResponse("slot"))
}

/// Unwraps a success payload, turning an error object into [`RpcError::Rpc`].
fn success_payload(response: RpcResponse) -> Result<Value, RpcError> {
    match response {
        RpcResponse::Success(value) => Ok(value),
        RpcResponse::Failure(error) => Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        }),
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &'static str) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|_| RpcError::InvalidResponse(what))
}

impl SolanaRpcClient {
    /// Creates a client with default tunables.
    ///
    /// Must be called from within a Tokio runtime: the first block-time sample
    /// is spawned immediately.
    pub fn new(endpoint: Url) -> Result<Self, RpcError> {
        Self::with_config(endpoint, RpcClientConfig::default())
    }

    pub fn with_config(endpoint: Url, config: RpcClientConfig) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(endpoint, config.http_timeout)?;
        let block_time = BlockTimeEstimator::new(transport.clone(), config.block_time.clone());
        let inner = ClientInner {
            transport,
            rate_limiter: RateLimiter::new(config.rate_limit_interval),
            cache: TtlCache::new(),
            block_time,
            config,
        };
        Ok(Self { inner: Arc::new(inner) })
    }

    pub fn endpoint(&self) -> &Url {
        self.inner.transport.endpoint()
    }

    /// Whether `method` may be dispatched now.
    pub async fn check_rate_limit(&self, method: &str) -> bool {
        self.inner.rate_limiter.check(method).await
    }

    /// Records a dispatch attempt of `method`.
    pub async fn update_rate_limit(&self, method: &str) {
        self.inner.rate_limiter.record(method).await
    }

    /// Single attempt, no rate limiting or retry.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<RpcResponse, RpcError> {
        self.inner.transport.call(method, params).await
    }

    pub async fn call_with_retry(&self, method: &str, params: &[Value]) -> Result<RpcResponse, RpcError> {
        let config = &self.inner.config;
        let max_attempts = config.max_attempts;
        let mut attempt = 0;

        while attempt < max_attempts {
            if !self.check_rate_limit(method).await {
                debug!(method = method, cooldown:? = config.rate_limit_cooldown; "Rate limit active, cooling down");
                tokio::time::sleep(config.rate_limit_cooldown).await;
                continue;
            }

            self.update_rate_limit(method).await;
            let is_last = attempt + 1 == max_attempts;

            let response = match self.call(method, params).await {
                Ok(response) => response,
                Err(e) if e.is_retryable() && !is_last => {
                    let delay = backoff_delay(config.base_delay, attempt);
                    warn!(
                        method = method,
                        attempt = attempt + 1,
                        max_attempts = max_attempts,
                        delay:? = delay,
                        error:% = e;
                        "RPC call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                },
                Err(e) => return Err(e),
            };

            if !response.is_throttled() || is_last {
                return Ok(response);
            }

            let delay = self.throttle_delay(&response, attempt);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }

        Err(RpcError::MaxRetriesExceeded)
    }

    /// Wait before retrying a throttled attempt: the server's hint if usable,
    /// otherwise one step more backoff than a transport failure would get.
    fn throttle_delay(&self, response: &RpcResponse, attempt: u32) -> Duration {
        let config = &self.inner.config;
        let fallback = backoff_delay(config.base_delay, attempt + 1);
        let hint = response.error().and_then(|e| e.retry_after.as_deref());

        match hint.map(|raw| (raw, parse_retry_after(raw, config.max_retry_after))) {
            Some((_, Ok(delay))) => {
                info!(
                    delay:? = delay,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts;
                    "Using server-specified Retry-After"
                );
                delay
            },
            Some((raw, Err(e))) => {
                warn!(
                    retry_after = raw,
                    error:% = e,
                    delay:? = fallback,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts;
                    "Failed to parse Retry-After, using exponential backoff"
                );
                fallback
            },
            None => {
                info!(
                    delay:? = fallback,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts;
                    "No Retry-After hint, using exponential backoff"
                );
                fallback
            },
        }
    }

    pub async fn get_slot(&self) -> Result<u64, RpcError> {
        fetch_slot(&self.inner.transport).await
    }

    pub async fn get_epoch_info(&self) -> Result<EpochInfo, RpcError> {
        let result = success_payload(self.call("getEpochInfo", &[]).await?)?;
        decode(result, "epoch info")
    }

    pub async fn get_validator_count(&self) -> Result<usize, RpcError> {
        let result = success_payload(self.call("getVoteAccounts", &[]).await?)?;
        let vote_accounts: VoteAccounts = decode(result, "vote accounts")?;
        Ok(vote_accounts.current.len())
    }

    /// Recent performance samples, oldest first. Malformed entries are skipped.
    pub async fn get_performance_samples(&self, limit: usize) -> Result<Vec<PerformanceSample>, RpcError> {
        let result = success_payload(self.call("getRecentPerformanceSamples", &[json!(limit)]).await?)?;
        let entries: Vec<Value> = decode(result, "performance samples")?;

        let mut samples: Vec<PerformanceSample> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        samples.sort_by_key(|s| s.slot);
        Ok(samples)
    }

    /// Performance samples for a dashboard time range, served from cache when fresh.
    pub async fn get_performance_window(
        &self,
        time_range: TimeRange,
        explicit_limit: Option<&str>,
    ) -> Result<PerformanceWindow, RpcError> {
        let limit = performance::resolve_sample_limit(time_range, explicit_limit);
        let key = performance::cache_key(time_range, limit);

        if let Some(CachedQuery::PerformanceSamples(samples)) = self.inner.cache.get(&key).await {
            debug!(key = &*key; "Serving performance window from cache");
            return Ok(PerformanceWindow {
                samples,
                time_range,
                limit,
                cached: true,
            });
        }

        let samples = self.get_performance_samples(limit).await?;
        self.inner
            .cache
            .set(key, CachedQuery::PerformanceSamples(samples.clone()), time_range.cache_ttl())
            .await;

        Ok(PerformanceWindow {
            samples,
            time_range,
            limit,
            cached: false,
        })
    }

    /// Current block-time estimate. Never waits for a measurement.
    pub async fn get_cached_block_time(&self) -> f64 {
        self.inner.block_time.current().await
    }

    /// Takes a block-time measurement in the caller's task and publishes it if plausible.
    ///
    /// For one-shot callers that exit before a background sample would finish.
    pub async fn sample_block_time(&self) -> Option<f64> {
        self.inner.block_time.sample().await
    }

    /// Account details; an address without a usable record yields [`AccountInfo::invalid`].
    pub async fn get_account_info(&self, address: &str) -> Result<AccountInfo, RpcError> {
        let response = self.call("getAccountInfo", &[json!(address)]).await?;

        let RpcResponse::Success(result) = response else {
            return Ok(AccountInfo::invalid(address));
        };
        let Ok(WithContext { value: Some(account) }) = serde_json::from_value::<WithContext<Option<UiAccount>>>(result)
        else {
            return Ok(AccountInfo::invalid(address));
        };

        Ok(AccountInfo {
            address: address.to_string(),
            balance: lamports_to_sol(account.lamports),
            executable: account.executable,
            data_length: account.data_length(),
            owner: account.owner,
            rent_epoch: account.rent_epoch,
            lamports: account.lamports,
            is_valid: true,
        })
    }

    /// Balance in SOL.
    pub async fn get_balance(&self, address: &str) -> Result<f64, RpcError> {
        let result = success_payload(self.call("getBalance", &[json!(address)]).await?)?;
        let balance: WithContext<u64> = decode(result, "balance")?;
        Ok(lamports_to_sol(balance.value))
    }

    pub async fn get_token_supply(&self, mint_address: &str) -> Result<TokenInfo, RpcError> {
        let response = self.call("getTokenSupply", &[json!(mint_address)]).await?;

        let RpcResponse::Success(result) = response else {
            return Ok(TokenInfo::invalid(mint_address));
        };
        let Ok(WithContext { value: amount }) = serde_json::from_value::<WithContext<UiTokenAmount>>(result) else {
            return Ok(TokenInfo::invalid(mint_address));
        };

        let supply = amount.amount.parse::<u64>().unwrap_or(0);
        let is_initialized = matches!(
            self.get_account_info(mint_address).await,
            Ok(AccountInfo { is_valid: true, .. })
        );

        Ok(TokenInfo {
            mint_address: mint_address.to_string(),
            supply,
            decimals: amount.decimals,
            is_initialized,
            freeze_authority: None,
            mint_authority: None,
            is_valid: true,
            actual_supply: scale_token_amount(supply, amount.decimals),
        })
    }

    /// Largest holders of a token, at most `limit` of them.
    ///
    /// Never fails: throttling, exhausted retries and malformed responses all
    /// yield an empty list so the dashboard can render "no data".
    pub async fn get_token_holders(&self, mint_address: &str, limit: usize) -> Vec<TokenHolder> {
        let key = format!("token_holders_{}_{}", mint_address, limit);
        let mint = mask_string(mint_address);
        if let Some(CachedQuery::TokenHolders(holders)) = self.inner.cache.get(&key).await {
            info!(mint = &*mint; "Returning cached token holders");
            return holders;
        }

        if !self.check_rate_limit(LARGEST_ACCOUNTS_METHOD).await {
            warn!(mint = &*mint; "Rate limited, returning empty holders list");
            return Vec::new();
        }

        let response = match self.call_with_retry(LARGEST_ACCOUNTS_METHOD, &[json!(mint_address)]).await {
            Ok(response) => response,
            Err(e) => {
                error!(mint = &*mint, error:% = e; "Failed to get token holders after retries");
                return Vec::new();
            },
        };

        let result = match response {
            RpcResponse::Success(result) => result,
            RpcResponse::Failure(e) => {
                warn!(mint = &*mint, code = e.code, message = &*e.message; "RPC error getting token holders");
                return Vec::new();
            },
        };

        let Ok(accounts) = serde_json::from_value::<WithContext<Vec<Value>>>(result) else {
            warn!(mint = &*mint; "Invalid response format for token holders");
            return Vec::new();
        };

        let holders: Vec<TokenHolder> = accounts
            .value
            .into_iter()
            .take(limit)
            .filter_map(|entry| serde_json::from_value::<TokenHolderBalance>(entry).ok())
            .map(TokenHolder::from)
            .collect();

        self.inner
            .cache
            .set(key, CachedQuery::TokenHolders(holders.clone()), TOKEN_HOLDERS_TTL)
            .await;
        holders
    }

    /// Assembles the dashboard metrics snapshot.
    pub async fn network_metrics(&self) -> Result<NetworkMetrics, MetricsError> {
        let current_slot = self.get_slot().await.map_err(MetricsError::at("slot"))?;
        let epoch_info = self.get_epoch_info().await.map_err(MetricsError::at("epoch info"))?;
        let validator_count = self
            .get_validator_count()
            .await
            .map_err(MetricsError::at("validator count"))?;
        let samples = self
            .get_performance_samples(METRICS_SAMPLE_LIMIT)
            .await
            .map_err(MetricsError::at("performance samples"))?;
        let average_block_time = self.get_cached_block_time().await;

        Ok(NetworkMetrics::derive(
            MetricsInputs {
                current_slot,
                epoch_info,
                validator_count,
                samples,
                average_block_time,
            },
            Utc::now(),
        ))
    }
}
