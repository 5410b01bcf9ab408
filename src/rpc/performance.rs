use std::{fmt, str::FromStr, time::Duration};

use serde::Serialize;
use utoipa::ToSchema;

use super::types::PerformanceSample;

/// Hard ceiling on the number of samples fetched for one window.
pub const MAX_SAMPLE_LIMIT: usize = 360;

/// Limit used when the caller passes a limit that is not a number.
pub const FALLBACK_SAMPLE_LIMIT: usize = 50;

/// Number of samples used for the dashboard metrics snapshot.
pub const METRICS_SAMPLE_LIMIT: usize = 150;

/// Dashboard time ranges. Upstream samples cover roughly one minute each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[default]
    #[serde(rename = "20m")]
    TwentyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::FiveMinutes => "5m",
            TimeRange::TwentyMinutes => "20m",
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
        }
    }

    pub fn sample_limit(&self) -> usize {
        match self {
            TimeRange::FiveMinutes => 5,
            TimeRange::TwentyMinutes => 20,
            TimeRange::OneHour => 60,
            TimeRange::SixHours => 360,
        }
    }

    /// Finer ranges go stale sooner.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            TimeRange::FiveMinutes => Duration::from_secs(15),
            TimeRange::TwentyMinutes => Duration::from_secs(30),
            TimeRange::OneHour => Duration::from_secs(60),
            TimeRange::SixHours => Duration::from_secs(120),
        }
    }

    /// Parses a range label, falling back to the default for anything unknown.
    pub fn parse_or_default(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(TimeRange::FiveMinutes),
            "20m" => Ok(TimeRange::TwentyMinutes),
            "1h" => Ok(TimeRange::OneHour),
            "6h" => Ok(TimeRange::SixHours),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

/// Resolves the number of samples to request.
///
/// An explicit limit wins over the range's own; one that does not parse becomes
/// [`FALLBACK_SAMPLE_LIMIT`]. The result never exceeds [`MAX_SAMPLE_LIMIT`].
pub fn resolve_sample_limit(range: TimeRange, explicit: Option<&str>) -> usize {
    let limit = match explicit.filter(|s| !s.is_empty()) {
        Some(raw) => raw.trim().parse::<usize>().unwrap_or(FALLBACK_SAMPLE_LIMIT),
        None => range.sample_limit(),
    };
    limit.min(MAX_SAMPLE_LIMIT)
}

pub fn cache_key(range: TimeRange, limit: usize) -> String {
    format!("performance_{}_{}", range, limit)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceWindow {
    pub samples: Vec<PerformanceSample>,
    pub time_range: TimeRange,
    pub limit: usize,
    pub cached: bool,
}
