//! A throttled logger (§4.7): drops calls beyond the first within an
//! interval. Used to rate-limit "uninitialized" warnings (default hourly)
//! and staleness warnings (default every 5 minutes), so a busy `enabled()`
//! hot path can't turn into a log flood.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::clock::now_nanos;

pub const DEFAULT_UNINITIALIZED_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_STALENESS_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A sink for throttled log lines. Boxed so `Flagset` can hold one
/// regardless of whether the caller wired `tracing`, a custom printf-style
/// function (the `logger(printf)` option), or nothing at all.
pub type LogSink = Box<dyn Fn(&str) + Send + Sync>;

pub struct ThrottledLogger {
    sink: LogSink,
    interval_nanos: u64,
    last_fired_nanos: AtomicU64,
}

impl ThrottledLogger {
    pub fn new(sink: LogSink, interval: Duration) -> Self {
        // Seed far enough in the past that the first call always fires.
        let interval_nanos = interval.as_nanos() as u64;
        Self { sink, interval_nanos, last_fired_nanos: AtomicU64::new(0) }
    }

    /// Default sink: forwards to `tracing::warn!`.
    pub fn tracing_default(interval: Duration) -> Self {
        Self::new(Box::new(|msg: &str| tracing::warn!("{msg}")), interval)
    }

    pub fn log(&self, message: &str) {
        let now = now_nanos();
        let last = self.last_fired_nanos.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.interval_nanos {
            return;
        }
        if self.last_fired_nanos.compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed).is_ok() {
            (self.sink)(message);
        }
    }
}
