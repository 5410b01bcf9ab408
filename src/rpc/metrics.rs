//! Derived dashboard metrics.
//!
//! Pure functions turning raw upstream samples into the numbers the dashboard
//! shows, and [`NetworkMetrics`], the snapshot assembled once per request.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::{
    error::RpcError,
    types::{EpochInfo, PerformanceSample},
};

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Average transactions per second across the window.
///
/// Samples with a zero period contribute nothing but still count toward the
/// average. An empty window yields 0.
pub fn calculate_tps(samples: &[PerformanceSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let total: f64 = samples
        .iter()
        .filter(|s| s.sample_period_secs > 0)
        .map(|s| s.num_transactions as f64 / s.sample_period_secs as f64)
        .sum();

    total / samples.len() as f64
}

/// Percentage of the current epoch already elapsed.
pub fn epoch_progress(slot_index: u64, slots_in_epoch: u64) -> f64 {
    if slots_in_epoch == 0 {
        return 0.0;
    }
    (slot_index as f64 / slots_in_epoch as f64) * 100.0
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// Converts a raw token integer amount into display units.
pub fn scale_token_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum NetworkHealth {
    Healthy,
    Good,
    Fair,
    Poor,
}

impl NetworkHealth {
    /// First matching rule wins.
    pub fn classify(tps: f64, validator_count: usize) -> Self {
        if tps > 100.0 && validator_count > 1000 {
            NetworkHealth::Healthy
        } else if tps > 50.0 && validator_count > 500 {
            NetworkHealth::Good
        } else if tps > 10.0 {
            NetworkHealth::Fair
        } else {
            NetworkHealth::Poor
        }
    }
}

impl fmt::Display for NetworkHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkHealth::Healthy => "Healthy",
            NetworkHealth::Good => "Good",
            NetworkHealth::Fair => "Fair",
            NetworkHealth::Poor => "Poor",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ConnectionStatus {
    Connected,
}

/// Raw readings a snapshot is derived from.
#[derive(Debug, Clone)]
pub struct MetricsInputs {
    pub current_slot: u64,
    pub epoch_info: EpochInfo,
    pub validator_count: usize,
    pub samples: Vec<PerformanceSample>,
    pub average_block_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub tps: f64,
    pub average_block_time: f64,
    pub current_slot: u64,
    pub epoch: u64,
    pub validator_count: usize,
    pub timestamp: DateTime<Utc>,
    pub epoch_progress: f64,
    pub slots_in_epoch: u64,
    pub slot_index: u64,
    pub network_health: NetworkHealth,
    pub connection_status: ConnectionStatus,
}

impl NetworkMetrics {
    pub fn derive(inputs: MetricsInputs, timestamp: DateTime<Utc>) -> Self {
        let tps = calculate_tps(&inputs.samples);
        let EpochInfo {
            epoch,
            slot_index,
            slots_in_epoch,
            ..
        } = inputs.epoch_info;

        Self {
            tps,
            average_block_time: inputs.average_block_time,
            current_slot: inputs.current_slot,
            epoch,
            validator_count: inputs.validator_count,
            timestamp,
            epoch_progress: epoch_progress(slot_index, slots_in_epoch),
            slots_in_epoch,
            slot_index,
            network_health: NetworkHealth::classify(tps, inputs.validator_count),
            connection_status: ConnectionStatus::Connected,
        }
    }
}

/// An upstream read needed for the snapshot failed.
#[derive(Debug, Error)]
#[error("Failed to get {stage}: {source}")]
pub struct MetricsError {
    pub stage: &'static str,
    #[source]
    pub source: RpcError,
}

impl MetricsError {
    pub(crate) fn at(stage: &'static str) -> impl FnOnce(RpcError) -> Self {
        move |source| Self { stage, source }
    }
}
