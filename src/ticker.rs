//! Per-flag observability throttling (§4.4, §9 "Per-flag observability
//! throttling").
//!
//! Counting every `enabled()` call to decide when to emit metrics would put
//! a write on the hot path. Instead each holder owns a [`Ticker`]: a bounded
//! token-releaser that produces at most one tick per interval. `enabled()`
//! non-blockingly tries to consume a tick before scheduling any metrics
//! work, so the hot path stays O(1) regardless of metric volume.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::clock::now_nanos;

/// The default per-flag ticker interval (§4.4).
pub const DEFAULT_TICKER_INTERVAL: Duration = Duration::from_secs(10);

pub struct Ticker {
    interval_nanos: u64,
    last_tick_nanos: AtomicU64,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval_nanos: interval.as_nanos() as u64, last_tick_nanos: AtomicU64::new(0) }
    }

    /// Attempt to consume a tick. Non-blocking: at most one caller per
    /// interval observes `true`; everyone else (including concurrent
    /// racers within the same interval) observes `false`.
    pub fn try_tick(&self) -> bool {
        let now = now_nanos();
        let last = self.last_tick_nanos.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.interval_nanos {
            return false;
        }
        self.last_tick_nanos.compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed).is_ok()
    }

    /// Stop is a no-op for this lock-free ticker: there is no background
    /// task to cancel. It exists so callers (the snapshot store on
    /// refresh, `Flagset::close`) have a uniform lifecycle hook regardless
    /// of the underlying timer implementation.
    pub fn stop(&self) {}
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICKER_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_always_fires() {
        let ticker = Ticker::new(Duration::from_secs(60));
        assert!(ticker.try_tick());
    }

    #[test]
    fn second_tick_within_interval_is_suppressed() {
        let ticker = Ticker::new(Duration::from_secs(60));
        assert!(ticker.try_tick());
        assert!(!ticker.try_tick());
    }

    #[test]
    fn zero_interval_always_fires() {
        let ticker = Ticker::new(Duration::from_nanos(0));
        assert!(ticker.try_tick());
        assert!(ticker.try_tick());
    }
}
