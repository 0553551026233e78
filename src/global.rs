//! The process-global evaluator (§6 "CLI / process-global surface", §9
//! "Global singleton").
//!
//! Expressed as an atomically-swappable cell holding either a real
//! [`Flagset`] or nothing. Before [`init`], [`enabled`] returns `false`
//! and logs a throttled warning rather than panicking — a library that
//! panics because some other part of the process hasn't called `init`
//! yet is worse than one that quietly defaults closed. Swapping in a new
//! evaluator closes the previous one in the background.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;

use crate::backend::Backend;
use crate::flagset::Flagset;
use crate::options::{uninitialized_log_interval, FlagsetOptions};
use crate::tag_args::IntoTags;
use crate::tags::TagMap;
use crate::throttle::ThrottledLogger;

fn cell() -> &'static ArcSwapOption<Flagset> {
    static CELL: OnceLock<ArcSwapOption<Flagset>> = OnceLock::new();
    CELL.get_or_init(ArcSwapOption::empty)
}

fn uninitialized_logger() -> &'static ThrottledLogger {
    static LOGGER: OnceLock<ThrottledLogger> = OnceLock::new();
    LOGGER.get_or_init(|| ThrottledLogger::tracing_default(uninitialized_log_interval()))
}

/// Construct the global evaluator and install it. If one was already
/// installed, it is closed on a background task once the new one is in
/// place. Must be called from within a Tokio runtime context.
pub fn init(backend: Arc<dyn Backend>, options: FlagsetOptions) -> Flagset {
    let flagset = Flagset::new(backend, options);
    let previous = cell().swap(Some(Arc::new(flagset.clone())));
    if let Some(previous) = previous {
        tokio::spawn(async move { previous.close().await });
    }
    flagset
}

/// Whether flag `name` is enabled, per the global evaluator. Returns
/// `false` and logs (throttled) if [`init`] has not been called yet.
pub fn enabled(name: &str, tags: impl IntoTags) -> bool {
    match cell().load_full() {
        Some(flagset) => flagset.enabled(name, tags),
        None => {
            uninitialized_logger().log(&format!("flagset.enabled({name:?}) called before init()"));
            false
        }
    }
}

/// Force `name` to `value` on the global evaluator. A no-op before `init`.
pub fn override_flag(name: impl Into<String>, value: bool) {
    if let Some(flagset) = cell().load_full() {
        flagset.override_flag(name, value);
    }
}

/// Merge `tags` into the global evaluator's default tags. A no-op before
/// `init`.
pub fn add_default_tags(tags: TagMap) {
    if let Some(flagset) = cell().load_full() {
        flagset.add_default_tags(tags);
    }
}

/// Stop the global evaluator's background work and remove it, restoring
/// the pre-`init` "uninitialized" behavior.
pub async fn close() {
    if let Some(flagset) = cell().swap(None) {
        flagset.close().await;
    }
}
