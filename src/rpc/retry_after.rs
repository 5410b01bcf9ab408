//! Parsing of the HTTP `Retry-After` header into a bounded wait.
//!
//! The header may carry either a number of seconds or an absolute date. Plain
//! seconds are clamped to the caller's ceiling ([`MAX_RETRY_AFTER`] by
//! default). Dates are accepted only when they lie strictly in the future and
//! no further away than that ceiling; anything else is a [`RetryAfterError`] and the caller falls back to its own
//! backoff.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use thiserror::Error;

/// Default upper bound on any wait derived from a `Retry-After` header.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(5 * 60);

/// Alternate date layouts tried after RFC 1123 / RFC 2822, in order.
const FALLBACK_FORMATS: [DateFormat; 4] = [
    // 02 Jan 06 15:04 MST
    DateFormat::NaiveUtc("%d %b %y %H:%M %Z"),
    // 02 Jan 06 15:04 -0700
    DateFormat::WithOffset("%d %b %y %H:%M %z"),
    // Monday, 02-Jan-06 15:04:05 MST
    DateFormat::NaiveUtc("%A, %d-%b-%y %H:%M:%S %Z"),
    DateFormat::Rfc3339,
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unable to parse Retry-After header: {0}")]
pub struct RetryAfterError(pub String);

#[derive(Debug, Clone, Copy)]
enum DateFormat {
    /// Layout whose zone is a name; the timestamp is read as UTC.
    NaiveUtc(&'static str),
    WithOffset(&'static str),
    Rfc3339,
}

impl DateFormat {
    fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            DateFormat::NaiveUtc(format) => NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|naive| naive.and_utc()),
            DateFormat::WithOffset(format) => DateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Parses a `Retry-After` value relative to the current time.
pub fn parse_retry_after(value: &str, ceiling: Duration) -> Result<Duration, RetryAfterError> {
    parse_retry_after_at(value, Utc::now(), ceiling)
}

/// Parses a `Retry-After` value relative to `now`.
pub fn parse_retry_after_at(value: &str, now: DateTime<Utc>, ceiling: Duration) -> Result<Duration, RetryAfterError> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<i64>() {
        // Negative counts mean "retry now".
        let seconds = u64::try_from(seconds).unwrap_or(0).min(ceiling.as_secs());
        return Ok(Duration::from_secs(seconds));
    }

    if let Some(wait) = DateTime::parse_from_rfc2822(value)
        .ok()
        .and_then(|retry_at| acceptable_wait(retry_at.with_timezone(&Utc), now, ceiling))
    {
        return Ok(wait);
    }

    FALLBACK_FORMATS
        .iter()
        .filter_map(|format| format.parse(value))
        .find_map(|retry_at| acceptable_wait(retry_at, now, ceiling))
        .ok_or_else(|| RetryAfterError(value.to_string()))
}

fn acceptable_wait(retry_at: DateTime<Utc>, now: DateTime<Utc>, ceiling: Duration) -> Option<Duration> {
    let wait = retry_at.signed_duration_since(now);
    if wait <= TimeDelta::zero() {
        return None;
    }
    let wait = wait.to_std().ok()?;
    (wait <= ceiling).then_some(wait)
}
