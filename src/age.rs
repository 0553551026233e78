//! Age categories (§4.7 "Age categories").

use std::time::Duration;

/// Which clock an [`Age`] measurement is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeKind {
    /// Time since the backend's last-known update (file mtime, payload's
    /// `updated` field).
    Source,
    /// Time since the evaluator's own last successful refresh.
    Backend,
}

#[derive(Debug, Clone, Copy)]
pub struct Age {
    pub kind: AgeKind,
    pub age: Duration,
}
