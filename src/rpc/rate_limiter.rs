use std::{collections::HashMap, time::Duration};

use tokio::{sync::RwLock, time::Instant};

pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(2);

/// Per-method minimum-interval gate.
///
/// The ledger stores the last dispatch attempt per method. `check` and
/// `record` take the lock separately, so two callers may both pass `check`
/// before either records; the limiter can be exceeded by that margin.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    ledger: RwLock<HashMap<String, Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_INTERVAL)
    }
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ledger: RwLock::new(HashMap::new()),
        }
    }

    /// Returns `true` when `method` has not been dispatched within the interval.
    pub async fn check(&self, method: &str) -> bool {
        let last_dispatch = self.ledger.read().await.get(method).copied();
        match last_dispatch {
            Some(at) => at.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Records a dispatch attempt for `method` at the current instant.
    pub async fn record(&self, method: &str) {
        self.ledger.write().await.insert(method.to_string(), Instant::now());
    }
}
