//! `FlagHolder`: the precomputed tuple the snapshot actually stores.

use std::time::Duration;

use crate::flag::{Clamp, Flag};
use crate::ticker::Ticker;

/// `(flag, clamp, per-flag-ticker)` — clamp is computed once at load time
/// so always-on/always-off flags short-circuit without touching rules.
pub struct FlagHolder {
    pub flag: Flag,
    pub clamp: Clamp,
    pub ticker: Ticker,
}

impl FlagHolder {
    pub fn new(flag: Flag, ticker_interval: Duration) -> Self {
        let clamp = flag.clamp();
        Self { flag, clamp, ticker: Ticker::new(ticker_interval) }
    }
}
