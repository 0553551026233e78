//! The evaluator (§4.5): composes the snapshot, default tags, overrides,
//! rand source and callback registry, and drives the background refresh
//! loop against a [`Backend`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::age::{Age, AgeKind};
use crate::backend::Backend;
use crate::callbacks::CallbackRegistry;
use crate::clock::now_nanos;
use crate::error::FlagError;
use crate::flag::Clamp;
use crate::options::{staleness_log_interval, FlagsetOptions};
use crate::overrides::{Context, OverrideMap};
use crate::rand_source::{RandSource, SeededRand, ThreadLocalRand};
use crate::snapshot::Snapshot;
use crate::tag_args::IntoTags;
use crate::tags::{merge, DefaultTags, TagMap};
use crate::throttle::ThrottledLogger;
use crate::ticker::Ticker;

struct Inner {
    backend: Arc<dyn Backend>,
    snapshot: Snapshot,
    default_tags: DefaultTags,
    overrides: OverrideMap,
    rand: Arc<dyn RandSource>,
    callbacks: CallbackRegistry,
    max_staleness: Option<Duration>,
    shrink_warning: bool,
    fallback_ticker: Ticker,
    last_refresh_nanos: AtomicU64,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    shutdown: Notify,
    staleness_logger: ThrottledLogger,
}

/// The evaluator. Cheap to clone (an `Arc` around shared state); `close()`
/// takes `&self` since any clone may hold the last handle out for a
/// request in flight.
#[derive(Clone)]
pub struct Flagset {
    inner: Arc<Inner>,
}

impl Flagset {
    /// Builds the evaluator and spawns its background refresh loop onto
    /// the current Tokio runtime. Must be called from within a runtime
    /// context (a `#[tokio::main]`/`#[tokio::test]` body, or after
    /// entering a `Handle`).
    pub fn new(backend: Arc<dyn Backend>, options: FlagsetOptions) -> Self {
        let (callbacks, options) = options.build_registry();
        let rand: Arc<dyn RandSource> = match options.seed {
            Some(seed) => Arc::new(SeededRand::new(seed)),
            None => Arc::new(ThreadLocalRand),
        };

        let inner = Arc::new(Inner {
            backend,
            snapshot: Snapshot::new(options.ticker_interval),
            default_tags: DefaultTags::new(options.tags.clone()),
            overrides: OverrideMap::new(options.override_flags.clone()),
            rand,
            callbacks,
            max_staleness: options.max_staleness,
            shrink_warning: options.shrink_warning,
            fallback_ticker: Ticker::new(options.ticker_interval),
            last_refresh_nanos: AtomicU64::new(0),
            refresh_task: Mutex::new(None),
            shutdown: Notify::new(),
            staleness_logger: ThrottledLogger::tracing_default(staleness_log_interval()),
        });

        let task_inner = inner.clone();
        let handle = tokio::spawn(Self::refresh_loop(task_inner, options.refresh_interval));
        *inner.refresh_task.lock() = Some(handle);

        Self { inner }
    }

    async fn refresh_loop(inner: Arc<Inner>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => Self::do_refresh(&inner).await,
                _ = inner.shutdown.notified() => break,
            }
        }
    }

    async fn do_refresh(inner: &Arc<Inner>) {
        let backend = inner.backend.clone();
        let outcome = match tokio::task::spawn_blocking(move || backend.refresh()).await {
            Ok(outcome) => outcome,
            Err(_join_error) => return,
        };

        let refresh = match outcome {
            Ok(refresh) => refresh,
            Err(err) => {
                inner.callbacks.dispatch_error(err);
                return;
            }
        };

        let old_len = inner.snapshot.len();
        let new_len = refresh.flags.len();
        inner.snapshot.update(refresh.flags);
        inner.last_refresh_nanos.store(now_nanos(), Ordering::Relaxed);

        if inner.shrink_warning && old_len > 0 && new_len <= old_len * 8 / 10 && old_len - new_len > 10 {
            inner.callbacks.dispatch_error(FlagError::FlagsShrunk { old_count: old_len, new_count: new_len });
        }

        if let Some(updated_at) = refresh.source_updated_at {
            let age = (Utc::now() - updated_at).to_std().unwrap_or(Duration::ZERO);
            inner.callbacks.dispatch_age(Age { kind: AgeKind::Source, age });
            if let Some(max) = inner.max_staleness {
                if age > max {
                    inner.callbacks.dispatch_error(FlagError::DataStale {
                        age_secs: age.as_secs_f64(),
                        threshold_secs: max.as_secs_f64(),
                    });
                    inner.staleness_logger.log(&format!(
                        "Backend is stale: source last updated {:.1}s ago, exceeding the {:.1}s threshold",
                        age.as_secs_f64(),
                        max.as_secs_f64()
                    ));
                }
            }
        }
    }

    /// Whether flag `name` is enabled for the given tags, with no
    /// request-scoped override context.
    pub fn enabled(&self, name: &str, tags: impl IntoTags) -> bool {
        self.enabled_with_context(name, tags, &Context::default())
    }

    /// Whether flag `name` is enabled, consulting `ctx`'s overrides before
    /// the evaluator-wide override map and the snapshot (§4.6).
    pub fn enabled_with_context(&self, name: &str, tags: impl IntoTags, ctx: &Context) -> bool {
        let inner = &self.inner;
        let holder = inner.snapshot.get(name);

        let ticker = holder.as_ref().map(|h| &h.ticker).unwrap_or(&inner.fallback_ticker);
        if ticker.try_tick() {
            inner.check_staleness();
        }

        if let Some(value) = ctx.get(name).or_else(|| inner.overrides.get(name)) {
            inner.callbacks.dispatch_check(name.to_string(), value);
            inner.callbacks.dispatch_evaluation(name.to_string(), value);
            return value;
        }

        let Some(holder) = holder else {
            inner.callbacks.dispatch_error(FlagError::UnknownFlag { name: name.to_string() });
            inner.callbacks.dispatch_check(name.to_string(), false);
            inner.callbacks.dispatch_evaluation(name.to_string(), false);
            return false;
        };

        let (enabled, err) = match holder.clamp {
            Clamp::AlwaysOn => (true, None),
            Clamp::AlwaysOff => (false, None),
            Clamp::MayVary => match tags.into_tags() {
                Ok(caller_tags) => {
                    let defaults = inner.default_tags.load();
                    let merged = merge(&defaults, &caller_tags);
                    holder.flag.evaluate(inner.rand.as_ref(), &merged, &defaults)
                }
                Err(e) => (false, Some(e)),
            },
        };

        if let Some(err) = err {
            inner.callbacks.dispatch_error(err);
        }
        inner.callbacks.dispatch_check(name.to_string(), enabled);
        inner.callbacks.dispatch_evaluation(name.to_string(), enabled);
        if holder.flag.is_deleted() {
            inner.callbacks.dispatch_deleted(name.to_string(), enabled);
        }

        enabled
    }

    /// Force `name` to `value` evaluator-wide, bypassing rule evaluation.
    pub fn override_flag(&self, name: impl Into<String>, value: bool) {
        self.inner.overrides.set(name, value);
    }

    /// Remove a previously-set evaluator-wide override.
    pub fn clear_override(&self, name: &str) {
        self.inner.overrides.clear(name);
    }

    /// Merge `tags` into the current default tags (`tags` wins on
    /// collision).
    pub fn add_default_tags(&self, tags: TagMap) {
        self.inner.default_tags.add(tags);
    }

    /// Replace the default tags wholesale.
    pub fn set_default_tags(&self, tags: TagMap) {
        self.inner.default_tags.set(tags);
    }

    /// How many flags the current snapshot holds.
    pub fn flag_count(&self) -> usize {
        self.inner.snapshot.len()
    }

    /// Stop the refresh loop and all per-flag tickers, and drain
    /// in-flight callback dispatches. `enabled()` remains safe to call
    /// afterwards and answers from the frozen snapshot.
    pub async fn close(&self) {
        self.inner.shutdown.notify_one();
        let handle = self.inner.refresh_task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.inner.snapshot.close();
        self.inner.callbacks.drain().await;
    }
}

impl Inner {
    /// Ticker-gated per-call observability (§4.5 step 2): reports the
    /// evaluator's own backend-age gauge on every tick, and additionally
    /// emits a `DataStale` error plus a throttled "Refresh has not run in
    /// …" log line once that age crosses `max_staleness`.
    fn check_staleness(&self) {
        let last = self.last_refresh_nanos.load(Ordering::Relaxed);
        if last == 0 {
            return;
        }
        let age = Duration::from_nanos(now_nanos().saturating_sub(last));
        self.callbacks.dispatch_age(Age { kind: AgeKind::Backend, age });

        let Some(max) = self.max_staleness else { return };
        if age > max {
            self.callbacks.dispatch_error(FlagError::DataStale {
                age_secs: age.as_secs_f64(),
                threshold_secs: max.as_secs_f64(),
            });
            self.staleness_logger.log(&format!(
                "Refresh has not run in {:.1}s, exceeding the {:.1}s threshold",
                age.as_secs_f64(),
                max.as_secs_f64()
            ));
        }
    }
}
