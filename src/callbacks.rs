//! Observability callbacks (§4.7) and their dispatch discipline (§5, §9
//! "Callback concurrency").
//!
//! Callbacks are external code; the evaluator never holds an internal lock
//! while invoking one. Dispatch happens on background `tokio` tasks bounded
//! by a semaphore sized at construction, so an `on_error` callback that's
//! slow to run can never turn into unbounded memory growth — once the
//! bound is hit, further dispatches for that tick are dropped rather than
//! queued, which is the same "fire-and-forget with backpressure" tradeoff
//! the per-flag ticker makes for metrics volume.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::age::Age;
use crate::error::FlagError;

pub type ErrorCallback = Arc<dyn Fn(FlagError) + Send + Sync>;
pub type AgeCallback = Arc<dyn Fn(Age) + Send + Sync>;
pub type CheckCallback = Arc<dyn Fn(String, bool) + Send + Sync>;
pub type EvaluationCallback = Arc<dyn Fn(String, bool) + Send + Sync>;
pub type DeletedCallback = Arc<dyn Fn(String, bool) + Send + Sync>;

/// The default bound on in-flight callback dispatch tasks.
pub const DEFAULT_MAX_INFLIGHT: usize = 64;

pub struct CallbackRegistry {
    errors: Vec<ErrorCallback>,
    ages: Vec<AgeCallback>,
    checks: Vec<CheckCallback>,
    evaluations: Vec<EvaluationCallback>,
    deletions: Vec<DeletedCallback>,
    inflight: Arc<Semaphore>,
    max_inflight: usize,
}

impl CallbackRegistry {
    pub fn new(max_inflight: usize) -> Self {
        Self {
            errors: Vec::new(),
            ages: Vec::new(),
            checks: Vec::new(),
            evaluations: Vec::new(),
            deletions: Vec::new(),
            inflight: Arc::new(Semaphore::new(max_inflight)),
            max_inflight,
        }
    }

    pub fn push_error(&mut self, cb: ErrorCallback) {
        self.errors.push(cb);
    }

    pub fn push_age(&mut self, cb: AgeCallback) {
        self.ages.push(cb);
    }

    pub fn push_check(&mut self, cb: CheckCallback) {
        self.checks.push(cb);
    }

    pub fn push_evaluation(&mut self, cb: EvaluationCallback) {
        self.evaluations.push(cb);
    }

    pub fn push_deleted(&mut self, cb: DeletedCallback) {
        self.deletions.push(cb);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn dispatch_error(&self, err: FlagError) {
        if self.errors.is_empty() {
            return;
        }
        let callbacks = self.errors.clone();
        self.spawn(move || {
            for cb in &callbacks {
                cb(err.clone());
            }
        });
    }

    pub fn dispatch_age(&self, age: Age) {
        if self.ages.is_empty() {
            return;
        }
        let callbacks = self.ages.clone();
        self.spawn(move || {
            for cb in &callbacks {
                cb(age);
            }
        });
    }

    pub fn dispatch_check(&self, name: String, enabled: bool) {
        if self.checks.is_empty() {
            return;
        }
        let callbacks = self.checks.clone();
        self.spawn(move || {
            for cb in &callbacks {
                cb(name.clone(), enabled);
            }
        });
    }

    pub fn dispatch_evaluation(&self, name: String, enabled: bool) {
        if self.evaluations.is_empty() {
            return;
        }
        let callbacks = self.evaluations.clone();
        self.spawn(move || {
            for cb in &callbacks {
                cb(name.clone(), enabled);
            }
        });
    }

    pub fn dispatch_deleted(&self, name: String, enabled: bool) {
        if self.deletions.is_empty() {
            return;
        }
        let callbacks = self.deletions.clone();
        self.spawn(move || {
            for cb in &callbacks {
                cb(name.clone(), enabled);
            }
        });
    }

    fn spawn(&self, work: impl FnOnce() + Send + 'static) {
        let Ok(permit) = self.inflight.clone().try_acquire_owned() else {
            return;
        };
        tokio::spawn(async move {
            work();
            drop(permit);
        });
    }

    /// Block until every in-flight callback dispatch has completed, or the
    /// bound's worth of permits have been reclaimed. Called from
    /// `Flagset::close`.
    pub async fn drain(&self) {
        let _ = self.inflight.acquire_many(self.max_inflight as u32).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn error_callback_is_invoked() {
        let mut registry = CallbackRegistry::new(4);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        registry.push_error(Arc::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch_error(FlagError::UnknownFlag { name: "x".into() });
        registry.drain().await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatch_with_no_callbacks_is_a_no_op() {
        let registry = CallbackRegistry::new(4);
        registry.dispatch_error(FlagError::Uninitialized);
        registry.drain().await;
    }
}
