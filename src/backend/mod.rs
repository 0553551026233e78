//! The backend contract (§6) and the four concrete flag-file parsers that
//! ship behind it.
//!
//! `refresh()` is synchronous: every shipped backend does a bounded local
//! read (a file on disk), and `Flagset`'s refresh loop runs it on a
//! blocking thread (`tokio::task::spawn_blocking`) rather than forcing
//! every backend implementation to be async just to satisfy a trait
//! object.

pub mod condition_json;
pub mod csv_backend;
pub mod json_v1;
pub mod json_v2;

use chrono::{DateTime, Utc};

use crate::error::FlagError;
use crate::flag::Flag;

/// The result of one `refresh()` call: the full flag set plus the
/// timestamp the backend's own source claims to have been last updated.
#[derive(Debug, Clone, Default)]
pub struct RefreshResult {
    pub flags: Vec<Flag>,
    pub source_updated_at: Option<DateTime<Utc>>,
}

/// A pluggable source of flag definitions.
pub trait Backend: Send + Sync {
    fn refresh(&self) -> Result<RefreshResult, FlagError>;
}

/// Converts a fractional unix-seconds timestamp (as used by the JSON
/// schemas' `updated` field) into a UTC instant, preserving nanosecond
/// precision.
pub(crate) fn seconds_to_datetime(seconds: f64) -> DateTime<Utc> {
    let secs = seconds.trunc() as i64;
    let nanos = (seconds.fract() * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or_else(Utc::now)
}
