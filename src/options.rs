//! Construction-time configuration for [`crate::flagset::Flagset`] (§6).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::callbacks::{AgeCallback, CallbackRegistry, CheckCallback, DeletedCallback, ErrorCallback, EvaluationCallback};
use crate::error::FlagError;
use crate::statsd::{ServiceCheckStatus, StatsdSink};
use crate::tags::TagMap;
use crate::throttle::{DEFAULT_STALENESS_INTERVAL, DEFAULT_UNINITIALIZED_INTERVAL};
use crate::ticker::DEFAULT_TICKER_INTERVAL;

/// The default refresh cadence when [`FlagsetOptions::refresh_interval`]
/// is not called.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// A construction-time options builder, consumed by `Flagset::new`.
///
/// Each setter takes `self` by value and returns it, so options read as a
/// chain: `FlagsetOptions::new().max_staleness(Duration::from_secs(300)).seed(7)`.
pub struct FlagsetOptions {
    pub(crate) tags: TagMap,
    pub(crate) max_staleness: Option<Duration>,
    pub(crate) refresh_interval: Duration,
    pub(crate) ticker_interval: Duration,
    pub(crate) seed: Option<u64>,
    pub(crate) override_flags: HashMap<String, bool>,
    pub(crate) shrink_warning: bool,
    pub(crate) max_inflight_callbacks: usize,
    pub(crate) default_logger_suppressed: bool,
    pending_error_callbacks: Vec<ErrorCallback>,
    pending_age_callbacks: Vec<AgeCallback>,
    pending_check_callbacks: Vec<CheckCallback>,
    pending_evaluation_callback: Vec<EvaluationCallback>,
    pending_deleted_callback: Vec<DeletedCallback>,
}

impl FlagsetOptions {
    pub fn new() -> Self {
        Self {
            tags: TagMap::new(),
            max_staleness: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            ticker_interval: DEFAULT_TICKER_INTERVAL,
            seed: None,
            override_flags: HashMap::new(),
            shrink_warning: true,
            max_inflight_callbacks: crate::callbacks::DEFAULT_MAX_INFLIGHT,
            default_logger_suppressed: false,
            pending_error_callbacks: Vec::new(),
            pending_age_callbacks: Vec::new(),
            pending_check_callbacks: Vec::new(),
            pending_evaluation_callback: Vec::new(),
            pending_deleted_callback: Vec::new(),
        }
    }

    pub fn tags(mut self, tags: TagMap) -> Self {
        self.tags = tags;
        self
    }

    pub fn max_staleness(mut self, threshold: Duration) -> Self {
        self.max_staleness = Some(threshold);
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn ticker_interval(mut self, interval: Duration) -> Self {
        self.ticker_interval = interval;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn override_flags(mut self, overrides: HashMap<String, bool>) -> Self {
        self.override_flags = overrides;
        self
    }

    pub fn shrink_warning(mut self, enabled: bool) -> Self {
        self.shrink_warning = enabled;
        self
    }

    pub fn max_inflight_callbacks(mut self, max: usize) -> Self {
        self.max_inflight_callbacks = max;
        self
    }

    pub fn on_error(mut self, cb: impl Fn(FlagError) + Send + Sync + 'static) -> Self {
        self.pending_error_callbacks.push(Arc::new(cb));
        self
    }

    pub fn on_age(mut self, cb: impl Fn(crate::age::Age) + Send + Sync + 'static) -> Self {
        self.pending_age_callbacks.push(Arc::new(cb));
        self
    }

    pub fn on_check(mut self, cb: impl Fn(String, bool) + Send + Sync + 'static) -> Self {
        self.pending_check_callbacks.push(Arc::new(cb));
        self
    }

    pub fn evaluation_callback(mut self, cb: impl Fn(String, bool) + Send + Sync + 'static) -> Self {
        self.pending_evaluation_callback.push(Arc::new(cb));
        self
    }

    pub fn deleted_callback(mut self, cb: impl Fn(String, bool) + Send + Sync + 'static) -> Self {
        self.pending_deleted_callback.push(Arc::new(cb));
        self
    }

    /// Installs a logger-backed error callback: every `FlagError` is
    /// formatted and handed to `log_fn`.
    pub fn log_errors(mut self, log_fn: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.default_logger_suppressed = true;
        self.pending_error_callbacks.push(Arc::new(move |err| log_fn(err.to_string())));
        self
    }

    /// Suppresses the default `tracing`-backed error logger, leaving any
    /// explicitly-registered `on_error`/`log_errors` callbacks untouched.
    pub fn suppress_errors(mut self) -> Self {
        self.default_logger_suppressed = true;
        self
    }

    /// Installs DataDog-style histogram/count/service-check forwarders
    /// driven off age and error callbacks.
    pub fn statsd(mut self, client: Arc<dyn StatsdSink>) -> Self {
        let hist_client = client.clone();
        self.pending_age_callbacks.push(Arc::new(move |age| {
            let metric = match age.kind {
                crate::age::AgeKind::Source => "flagset.age.source",
                crate::age::AgeKind::Backend => "flagset.age.backend",
            };
            hist_client.histogram(metric, age.age.as_secs_f64(), &[]);
        }));
        self.pending_error_callbacks.push(Arc::new(move |err| {
            use crate::error::Critical;
            let status = if err.is_critical() { ServiceCheckStatus::Critical } else { ServiceCheckStatus::Warning };
            client.service_check("flagset.error", status, &[]);
            client.count("flagset.errors", 1, &[]);
        }));
        self
    }

    /// Replace the internal fallback error logger (the `logger(printf)`
    /// option) with a custom sink. Equivalent to `log_errors` plus
    /// suppressing the default, kept as a distinct method name to mirror
    /// the documented option surface.
    pub fn logger(self, printf: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.log_errors(printf)
    }

    pub(crate) fn build_registry(self) -> (CallbackRegistry, Self) {
        let mut registry = CallbackRegistry::new(self.max_inflight_callbacks);
        if !self.default_logger_suppressed {
            registry.push_error(Arc::new(|err| tracing::warn!(%err, "flagset error")));
        }
        for cb in &self.pending_error_callbacks {
            registry.push_error(cb.clone());
        }
        for cb in &self.pending_age_callbacks {
            registry.push_age(cb.clone());
        }
        for cb in &self.pending_check_callbacks {
            registry.push_check(cb.clone());
        }
        for cb in &self.pending_evaluation_callback {
            registry.push_evaluation(cb.clone());
        }
        for cb in &self.pending_deleted_callback {
            registry.push_deleted(cb.clone());
        }
        (registry, self)
    }
}

impl Default for FlagsetOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn uninitialized_log_interval() -> Duration {
    DEFAULT_UNINITIALIZED_INTERVAL
}

pub(crate) fn staleness_log_interval() -> Duration {
    DEFAULT_STALENESS_INTERVAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_logger_fires_unless_suppressed() {
        let opts = FlagsetOptions::new();
        let (registry, _opts) = opts.build_registry();
        registry.dispatch_error(FlagError::Uninitialized);
        registry.drain().await;
    }

    #[test]
    fn suppress_errors_removes_default_logger() {
        let opts = FlagsetOptions::new().suppress_errors();
        assert!(opts.default_logger_suppressed);
    }

    #[test]
    fn statsd_option_wires_age_and_error_callbacks() {
        use crate::statsd::test_support::RecordingSink;
        let sink = RecordingSink::default();
        let opts = FlagsetOptions::new().statsd(Arc::new(sink.clone()));
        assert_eq!(opts.pending_age_callbacks.len(), 1);
        assert_eq!(opts.pending_error_callbacks.len(), 1);
    }
}
