//! A single monotonic nanosecond clock shared by the ticker and the
//! throttled logger, so "elapsed since X" math is consistent crate-wide.

use std::sync::OnceLock;
use std::time::Instant;

fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

pub fn now_nanos() -> u64 {
    process_start().elapsed().as_nanos() as u64
}
