//! JSON v2 (§6): predicate-rule flags. `{ version, updated, flags: [{
//! name, _id, seed, rules: [{ hash_by, percent, predicates, rollout_type?
//! }], updated, version, deleted?, edge_override?, testmode_only? }] }`.
//! Unknown keys are ignored — serde's default behavior, since
//! `deny_unknown_fields` is never applied here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FlagError;
use crate::flag::predicate::{Predicate2, PredicateFlag, Rule2};
use crate::flag::Flag;

use super::{seconds_to_datetime, Backend, RefreshResult};

#[derive(Deserialize)]
struct WireFile {
    #[allow(dead_code)]
    version: u32,
    updated: f64,
    flags: Vec<WireFlag>,
}

#[allow(dead_code)]
#[derive(Deserialize)]
struct WireFlag {
    name: String,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    seed: String,
    #[serde(default)]
    rules: Vec<WireRule>,
    #[serde(default)]
    updated: Option<f64>,
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    edge_override: Option<bool>,
    #[serde(default)]
    testmode_only: Option<bool>,
}

#[allow(dead_code)]
#[derive(Deserialize)]
struct WireRule {
    hash_by: String,
    percent: f64,
    #[serde(default)]
    predicates: Vec<Predicate2>,
    #[serde(default)]
    rollout_type: Option<String>,
}

impl From<WireFlag> for PredicateFlag {
    fn from(wire: WireFlag) -> Self {
        PredicateFlag {
            name: wire.name,
            seed: wire.seed,
            rules: wire.rules.into_iter().map(|r| Rule2 { hash_by: r.hash_by, percent: r.percent, predicates: r.predicates }).collect(),
            deleted: wire.deleted,
        }
    }
}

pub struct JsonV2Backend {
    path: PathBuf,
}

impl JsonV2Backend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Backend for JsonV2Backend {
    fn refresh(&self) -> Result<RefreshResult, FlagError> {
        let bytes = std::fs::read(&self.path).map_err(|_| FlagError::FileMissing { path: self.path.clone() })?;
        let wire: WireFile =
            serde_json::from_slice(&bytes).map_err(|e| FlagError::FileFormat { path: self.path.clone(), cause: e.to_string() })?;

        let flags = wire.flags.into_iter().map(|f| Flag::Predicate(PredicateFlag::from(f))).collect();

        Ok(RefreshResult { flags, source_updated_at: Some(seconds_to_datetime(wire.updated)) })
    }
}
