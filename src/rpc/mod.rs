//! Access layer for a Solana JSON-RPC upstream.
//!
//! Everything the HTTP handlers need from the node goes through
//! [`SolanaRpcClient`]. The submodules hold its parts:
//!
//! - [`transport`]: one JSON-RPC 2.0 POST, with 429 responses annotated by their
//!   `Retry-After` header
//! - [`retry_after`]: parsing of that header into a bounded wait
//! - [`rate_limiter`]: per-method minimum dispatch interval
//! - [`client`]: the retrying caller and typed queries
//! - [`cache`]: TTL memoization of expensive queries
//! - [`block_time`]: background seconds-per-block estimate
//! - [`metrics`]: derived dashboard figures

pub mod block_time;
pub mod cache;
pub mod client;
pub mod error;
pub mod metrics;
pub mod performance;
pub mod rate_limiter;
pub mod retry_after;
mod transport;
pub mod types;

pub use block_time::BlockTimeConfig;
pub use client::{DEFAULT_RPC_URL, RpcClientConfig, SolanaRpcClient};
pub use error::RpcError;
pub use metrics::{MetricsError, NetworkHealth, NetworkMetrics};
pub use performance::{PerformanceWindow, TimeRange};
pub use types::{AccountInfo, EpochInfo, PerformanceSample, RpcResponse, TokenHolder, TokenHolderBalance, TokenInfo};
