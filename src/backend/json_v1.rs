//! Legacy JSON v1 (§6): `{ version, updated, flags: [{ name, active,
//! rules: [{ type, ...fields, on_match?, on_miss? }] }] }`. `type` is
//! `match_list` or `sample`; an omitted action defaults to
//! `on_match = on`, `on_miss = off`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FlagError;
use crate::flag::rule_list::{Rule, RuleAction, RuleInfo, RuleListFlag};
use crate::flag::Flag;

use super::{seconds_to_datetime, Backend, RefreshResult};

fn default_on() -> RuleAction {
    RuleAction::On
}

fn default_off() -> RuleAction {
    RuleAction::Off
}

#[derive(Deserialize)]
struct WireFile {
    #[allow(dead_code)]
    version: u32,
    updated: f64,
    flags: Vec<WireFlag>,
}

#[derive(Deserialize)]
struct WireFlag {
    name: String,
    active: bool,
    #[serde(default)]
    rules: Vec<WireRule>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireRule {
    MatchList {
        property: String,
        values: Vec<String>,
        #[serde(default = "default_on")]
        on_match: RuleAction,
        #[serde(default = "default_off")]
        on_miss: RuleAction,
    },
    Sample {
        rate: f64,
        #[serde(default)]
        properties: Vec<String>,
        #[serde(default = "default_on")]
        on_match: RuleAction,
        #[serde(default = "default_off")]
        on_miss: RuleAction,
    },
}

impl From<WireRule> for RuleInfo {
    fn from(wire: WireRule) -> Self {
        match wire {
            WireRule::MatchList { property, values, on_match, on_miss } => {
                RuleInfo { rule: Rule::MatchList { property, values }, on_match, on_miss }
            }
            WireRule::Sample { rate, properties, on_match, on_miss } => {
                RuleInfo { rule: Rule::Rate { rate, properties }, on_match, on_miss }
            }
        }
    }
}

pub struct JsonV1Backend {
    path: PathBuf,
}

impl JsonV1Backend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Backend for JsonV1Backend {
    fn refresh(&self) -> Result<RefreshResult, FlagError> {
        let bytes = std::fs::read(&self.path).map_err(|_| FlagError::FileMissing { path: self.path.clone() })?;
        let wire: WireFile =
            serde_json::from_slice(&bytes).map_err(|e| FlagError::FileFormat { path: self.path.clone(), cause: e.to_string() })?;

        let flags = wire
            .flags
            .into_iter()
            .map(|f| Flag::RuleList(RuleListFlag { name: f.name, active: f.active, rules: f.rules.into_iter().map(RuleInfo::from).collect() }))
            .collect();

        Ok(RefreshResult { flags, source_updated_at: Some(seconds_to_datetime(wire.updated)) })
    }
}
