//! The error taxonomy routed through callback chains.
//!
//! Nothing in this crate throws: evaluation and refresh both continue past
//! almost every error here. Errors are values, fanned out to every
//! registered callback (see [`crate::callbacks`]), and cloned to do it.

use std::path::PathBuf;

use thiserror::Error;

/// A single evaluation- or refresh-time error.
///
/// Clone because the same value is delivered to every registered error
/// callback; there is no single "owner" of a `FlagError`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlagError {
    #[error("unknown flag: {name}")]
    UnknownFlag { name: String },

    #[error("flag {flag} references tag {tag}, which is not present in the merged tag set")]
    MissingTag { flag: String, tag: String },

    #[error("invalid tag argument list: {detail}")]
    InvalidTagList { detail: String },

    #[error("refresh data is stale: age {age_secs}s exceeds threshold {threshold_secs}s")]
    DataStale { age_secs: f64, threshold_secs: f64 },

    #[error("flag file missing: {path}")]
    FileMissing { path: PathBuf },

    #[error("failed to parse flag file {path}: {cause}")]
    FileFormat { path: PathBuf, cause: String },

    #[error("refresh dropped {old_count} -> {new_count} flags, which looks like data loss rather than an intentional deletion")]
    FlagsShrunk { old_count: usize, new_count: usize },

    #[error("flagset used before init()")]
    Uninitialized,

    #[error("unknown predicate operation: {op}")]
    UnknownOperation { op: String },

    #[error("unknown rule action: {action}")]
    UnknownAction { action: String },
}

/// Marker for errors that should escalate service-check severity.
///
/// Critical errors never abort the process; the marker only changes how
/// loudly an `on_error`/`statsd` integration reports them.
pub trait Critical {
    fn is_critical(&self) -> bool;
}

impl Critical for FlagError {
    fn is_critical(&self) -> bool {
        matches!(self, FlagError::FileMissing { .. } | FlagError::FileFormat { .. })
    }
}
