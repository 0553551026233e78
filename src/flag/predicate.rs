//! Variant B: seeded predicate-rule flags (§4.3).

use std::collections::HashSet;

use crate::error::FlagError;
use crate::hashing::predicate_hash_fraction;
use crate::rand_source::RandSource;
use crate::tags::{lookup_with_default_fallback, TagMap};

use super::Clamp;

pub const RANDOM_HASH_BY: &str = "_random";

/// A single attribute test. `in`/`not_in` compare against a value set;
/// `is_nil`/`is_not_nil` only check presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    In,
    NotIn,
    IsNil,
    IsNotNil,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Predicate2 {
    pub attribute: String,
    pub operation: Operation,
    #[serde(default)]
    pub values: HashSet<String>,
}

impl Predicate2 {
    fn matches(&self, merged: &TagMap, defaults: &TagMap) -> bool {
        let found = lookup_with_default_fallback(merged, defaults, &self.attribute);
        match self.operation {
            Operation::In => found.map(|v| self.values.contains(v)).unwrap_or(false),
            Operation::NotIn => found.map(|v| !self.values.contains(v)).unwrap_or(true),
            Operation::IsNil => found.is_none(),
            Operation::IsNotNil => found.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Rule2 {
    pub hash_by: String,
    pub percent: f64,
    #[serde(default)]
    pub predicates: Vec<Predicate2>,
}

impl Rule2 {
    fn is_applicable(&self, merged: &TagMap, defaults: &TagMap) -> bool {
        if self.hash_by == RANDOM_HASH_BY {
            return true;
        }
        if self.percent > 0.0 && self.percent < 1.0 {
            return lookup_with_default_fallback(merged, defaults, &self.hash_by).is_some();
        }
        true
    }

    fn evaluate(
        &self,
        rand: &dyn RandSource,
        seed: &str,
        merged: &TagMap,
        defaults: &TagMap,
    ) -> Option<(bool, Option<FlagError>)> {
        if !self.is_applicable(merged, defaults) {
            return None;
        }

        for predicate in &self.predicates {
            if !predicate.matches(merged, defaults) {
                return None;
            }
        }

        if self.percent >= 1.0 {
            return Some((true, None));
        }
        if self.percent <= 0.0 {
            return Some((false, None));
        }
        if self.hash_by == RANDOM_HASH_BY {
            return Some((rand.float64() < self.percent, None));
        }

        match lookup_with_default_fallback(merged, defaults, &self.hash_by) {
            Some(value) => Some((predicate_hash_fraction(seed, value) < self.percent, None)),
            None => Some((false, Some(FlagError::MissingTag { flag: seed.to_string(), tag: self.hash_by.clone() }))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PredicateFlag {
    pub name: String,
    pub seed: String,
    pub rules: Vec<Rule2>,
    #[serde(default)]
    pub deleted: bool,
}

impl PredicateFlag {
    pub fn clamp(&self) -> Clamp {
        if self.rules.is_empty() {
            return Clamp::AlwaysOff;
        }
        if let [rule] = self.rules.as_slice() {
            if rule.predicates.is_empty() {
                if rule.percent <= 0.0 {
                    return Clamp::AlwaysOff;
                }
                if rule.percent >= 1.0 {
                    return Clamp::AlwaysOn;
                }
            }
        }
        Clamp::MayVary
    }

    pub fn evaluate(&self, rand: &dyn RandSource, merged: &TagMap, defaults: &TagMap) -> (bool, Option<FlagError>) {
        for rule in &self.rules {
            if let Some(result) = rule.evaluate(rand, &self.seed, merged, defaults) {
                return result;
            }
        }
        (false, None)
    }
}
