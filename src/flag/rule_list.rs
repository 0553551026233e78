//! Variant A: ordered rule-list flags (§4.2).

use crate::error::FlagError;
use crate::hashing::rate_hash_fraction;
use crate::rand_source::RandSource;
use crate::tags::TagMap;

use super::Clamp;

/// What a matched (or missed) rule does to evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    On,
    Off,
    Continue,
}

/// A single test a rule performs against the merged tag map.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    MatchList { property: String, values: Vec<String> },
    Rate { rate: f64, #[serde(default)] properties: Vec<String> },
}

impl Rule {
    /// Returns whether the rule matched, or an error if a required
    /// property was missing from the merged tags.
    fn handle(&self, rand: &dyn RandSource, flag_name: &str, merged: &TagMap) -> Result<bool, FlagError> {
        match self {
            Rule::MatchList { property, values } => {
                let value = merged.get(property).ok_or_else(|| FlagError::MissingTag {
                    flag: flag_name.to_string(),
                    tag: property.clone(),
                })?;
                Ok(values.iter().any(|v| v == value))
            }
            Rule::Rate { rate, properties } => {
                if properties.is_empty() {
                    Ok(rand.float64() < *rate)
                } else {
                    let mut sorted_names = properties.clone();
                    sorted_names.sort();
                    let mut values = Vec::with_capacity(sorted_names.len());
                    for name in &sorted_names {
                        let value = merged.get(name).ok_or_else(|| FlagError::MissingTag {
                            flag: flag_name.to_string(),
                            tag: name.clone(),
                        })?;
                        values.push(value.as_str());
                    }
                    let fraction = rate_hash_fraction(flag_name, &values);
                    Ok(fraction < *rate)
                }
            }
        }
    }
}

/// A rule plus the actions to take on match/miss.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RuleInfo {
    #[serde(flatten)]
    pub rule: Rule,
    pub on_match: RuleAction,
    pub on_miss: RuleAction,
}

/// An ordered-rule-list flag.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RuleListFlag {
    pub name: String,
    pub active: bool,
    pub rules: Vec<RuleInfo>,
}

impl RuleListFlag {
    pub fn clamp(&self) -> Clamp {
        if !self.active {
            return Clamp::AlwaysOff;
        }
        if self.rules.is_empty() {
            return Clamp::AlwaysOn;
        }
        if let [RuleInfo { rule: Rule::Rate { rate, .. }, on_match, on_miss }] = self.rules.as_slice() {
            if *rate <= 0.0 {
                return clamp_for_action(*on_miss).unwrap_or(Clamp::MayVary);
            }
            if *rate >= 1.0 {
                return clamp_for_action(*on_match).unwrap_or(Clamp::MayVary);
            }
        }
        Clamp::MayVary
    }

    pub fn evaluate(&self, rand: &dyn RandSource, merged: &TagMap) -> (bool, Option<FlagError>) {
        if !self.active {
            return (false, None);
        }
        if self.rules.is_empty() {
            return (true, None);
        }
        for rule_info in &self.rules {
            match rule_info.rule.handle(rand, &self.name, merged) {
                Ok(matched) => {
                    let action = if matched { rule_info.on_match } else { rule_info.on_miss };
                    match action {
                        RuleAction::On => return (true, None),
                        RuleAction::Off => return (false, None),
                        RuleAction::Continue => continue,
                    }
                }
                Err(e) => return (false, Some(e)),
            }
        }
        (false, None)
    }
}

fn clamp_for_action(action: RuleAction) -> Option<Clamp> {
    match action {
        RuleAction::On => Some(Clamp::AlwaysOn),
        RuleAction::Off => Some(Clamp::AlwaysOff),
        RuleAction::Continue => None,
    }
}
