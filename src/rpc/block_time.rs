//! Background estimation of the average block (slot) time.
//!
//! Readers never wait for a measurement. [`BlockTimeEstimator::current`] returns
//! the last published value, or the configured default before the first one, and
//! when that value is stale it spawns a detached sampling task. A sample reads
//! the chain height twice, [`BlockTimeConfig::sample_interval`] apart, and is
//! published only if the resulting seconds-per-block falls inside the
//! plausibility band. Overlapping samples are allowed; the last to finish wins.

use std::{
    ops::RangeInclusive,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use tokio::sync::RwLock;

use super::{client::fetch_slot, transport::HttpTransport};

pub const DEFAULT_BLOCK_TIME: f64 = 0.4;
pub const PLAUSIBLE_BLOCK_TIME: RangeInclusive<f64> = 0.1..=2.0;

#[derive(Debug, Clone)]
pub struct BlockTimeConfig {
    /// How long a published value is served before a new sample is triggered.
    pub freshness: Duration,
    /// Wall-clock gap between the two height readings of a sample.
    pub sample_interval: Duration,
    /// Start sampling as soon as the estimator is created.
    pub sample_on_start: bool,
    /// Served until the first plausible sample lands.
    pub default_block_time: f64,
    /// Samples outside this band are discarded.
    pub plausible_range: RangeInclusive<f64>,
}

impl Default for BlockTimeConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(30),
            sample_interval: Duration::from_secs(3),
            sample_on_start: true,
            default_block_time: DEFAULT_BLOCK_TIME,
            plausible_range: PLAUSIBLE_BLOCK_TIME,
        }
    }
}

impl BlockTimeConfig {
    pub fn is_plausible(&self, block_time: f64) -> bool {
        self.plausible_range.contains(&block_time)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct BlockTimeState {
    value: Option<f64>,
    computed_at: Option<Instant>,
}

/// Seconds per block over `interval`, or `None` when the height did not advance.
pub fn seconds_per_block(start_slot: u64, end_slot: u64, interval: Duration) -> Option<f64> {
    if end_slot <= start_slot {
        return None;
    }
    Some(interval.as_secs_f64() / (end_slot - start_slot) as f64)
}

#[derive(Debug, Clone)]
pub(crate) struct BlockTimeEstimator {
    transport: HttpTransport,
    state: Arc<RwLock<BlockTimeState>>,
    config: BlockTimeConfig,
}

impl BlockTimeEstimator {
    pub fn new(transport: HttpTransport, config: BlockTimeConfig) -> Self {
        let estimator = Self {
            transport,
            state: Arc::new(RwLock::new(BlockTimeState::default())),
            config,
        };
        if estimator.config.sample_on_start {
            estimator.spawn_sample();
        }
        estimator
    }

    /// Returns the current estimate, triggering a background sample when it is stale.
    pub async fn current(&self) -> f64 {
        let state = *self.state.read().await;

        if let (Some(value), Some(computed_at)) = (state.value, state.computed_at) {
            if computed_at.elapsed() < self.config.freshness {
                return value;
            }
        }

        self.spawn_sample();
        state.value.unwrap_or(self.config.default_block_time)
    }

    pub fn spawn_sample(&self) {
        let estimator = self.clone();
        tokio::spawn(async move {
            estimator.sample().await;
        });
    }

    /// Takes one measurement and publishes it if it is plausible.
    pub async fn sample(&self) -> Option<f64> {
        let start_slot = match fetch_slot(&self.transport).await {
            Ok(slot) => slot,
            Err(e) => {
                warn!(error:% = e; "Block time sample aborted, could not read start slot");
                return None;
            },
        };

        // No lock is held across this wait.
        tokio::time::sleep(self.config.sample_interval).await;

        let end_slot = match fetch_slot(&self.transport).await {
            Ok(slot) => slot,
            Err(e) => {
                warn!(error:% = e; "Block time sample aborted, could not read end slot");
                return None;
            },
        };

        let Some(block_time) = seconds_per_block(start_slot, end_slot, self.config.sample_interval) else {
            debug!(start_slot = start_slot, end_slot = end_slot; "Slot did not advance, discarding block time sample");
            return None;
        };

        if !self.config.is_plausible(block_time) {
            debug!(block_time = block_time; "Implausible block time sample discarded");
            return None;
        }

        self.publish(block_time).await;
        Some(block_time)
    }

    async fn publish(&self, block_time: f64) {
        let mut state = self.state.write().await;
        state.value = Some(block_time);
        state.computed_at = Some(Instant::now());
        drop(state);
        info!(block_time = format!("{:.3}", block_time).as_str(); "Updated block time");
    }
}
