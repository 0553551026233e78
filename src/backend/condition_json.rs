//! The "condition" JSON variant (§6): structurally identical to JSON v1,
//! but an omitted rule action defaults to `on_match = enabled` (On),
//! `on_miss = next` (Continue) rather than v1's on/off defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::FlagError;
use crate::flag::rule_list::{Rule, RuleAction, RuleInfo, RuleListFlag};
use crate::flag::Flag;

use super::{seconds_to_datetime, Backend, RefreshResult};

fn default_on() -> RuleAction {
    RuleAction::On
}

fn default_continue() -> RuleAction {
    RuleAction::Continue
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
        #[serde(default = "default_continue")]
        on_miss: RuleAction,
    },
    Sample {
        rate: f64,
        #[serde(default)]
        properties: Vec<String>,
        #[serde(default = "default_on")]
        on_match: RuleAction,
        #[serde(default = "default_continue")]
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

pub struct ConditionJsonBackend {
    path: PathBuf,
}

impl ConditionJsonBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Backend for ConditionJsonBackend {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "{contents}").expect("write");
        file
    }

    #[test]
    fn omitted_actions_default_to_enabled_and_next() {
        let file = write_json(
            r#"{
                "version": 1,
                "updated": 42.0,
                "flags": [
                    { "name": "f", "active": true, "rules": [
                        { "type": "match_list", "property": "host", "values": ["a"] }
                    ]}
                ]
            }"#,
        );
        let backend = ConditionJsonBackend::new(file.path());
        let result = backend.refresh().expect("refresh");
        let Flag::RuleList(flag) = &result.flags[0] else { panic!("expected rule-list flag") };
        assert_eq!(flag.rules[0].on_match, RuleAction::On);
        assert_eq!(flag.rules[0].on_miss, RuleAction::Continue);
    }
}
