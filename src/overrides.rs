//! The override facility (§4.6): an in-evaluator map consulted before the
//! snapshot, plus an immutable per-request [`Context`] for scoped overrides.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Evaluator-wide overrides, set via `Flagset::override_flag` and mutated
/// rarely (typically only at test setup time), so a plain mutex is fine.
#[derive(Default)]
pub struct OverrideMap {
    inner: Mutex<HashMap<String, bool>>,
}

impl OverrideMap {
    pub fn new(initial: HashMap<String, bool>) -> Self {
        Self { inner: Mutex::new(initial) }
    }

    pub fn set(&self, name: impl Into<String>, value: bool) {
        self.inner.lock().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.inner.lock().get(name).copied()
    }

    pub fn clear(&self, name: &str) {
        self.inner.lock().remove(name);
    }
}

/// An immutable, per-request override context. Derive child contexts by
/// structural sharing (an `Arc`-wrapped map plus the new entry); children
/// inherit parent overrides, and changes to a child never affect its
/// parent (§4.6, §9 "Context-scoped overrides"). Deliberately not a
/// thread-local: the caller threads it explicitly through request context,
/// which keeps `Flagset` correctness independent of the host's threading
/// model.
#[derive(Clone, Default)]
pub struct Context {
    overrides: Arc<HashMap<String, bool>>,
}

impl Context {
    pub fn get(&self, name: &str) -> Option<bool> {
        self.overrides.get(name).copied()
    }

    /// Returns a new child context with `name` forced to `value`. The
    /// parent (`self`) is left untouched.
    pub fn with_override(&self, name: impl Into<String>, value: bool) -> Context {
        let mut child = (*self.overrides).clone();
        child.insert(name.into(), value);
        Context { overrides: Arc::new(child) }
    }
}
