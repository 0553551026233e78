//! The lock-free snapshot store (§3, §4.4, §9 "Snapshot publication").
//!
//! Readers perform a single atomic load and an immutable map lookup; no
//! writer-side mutex is ever acquired on that path. Writers (the refresh
//! loop) take `write_lock` for the duration of building the next map, then
//! publish it with one atomic store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::flag::Flag;
use crate::holder::FlagHolder;

type Map = HashMap<String, Arc<FlagHolder>>;

pub struct Snapshot {
    current: ArcSwap<Map>,
    write_lock: Mutex<()>,
    ticker_interval: Duration,
}

impl Snapshot {
    pub fn new(ticker_interval: Duration) -> Self {
        Self { current: ArcSwap::from_pointee(Map::new()), write_lock: Mutex::new(()), ticker_interval }
    }

    /// Lock-free lookup. The only operation on the hot path.
    pub fn get(&self, name: &str) -> Option<Arc<FlagHolder>> {
        self.current.load().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Replace the snapshot with one built from `flags`. Holders whose
    /// flag compares `equal` to the previous snapshot's are reused
    /// (pointer-identity preserved, per §8's holder-identity law); holders
    /// for vanished flags have their ticker stopped.
    pub fn update(&self, flags: Vec<Flag>) {
        let _guard = self.write_lock.lock();
        let old = self.current.load_full();

        let mut new_map = Map::with_capacity(flags.len());
        let mut changed = flags.len() != old.len();
        for flag in flags {
            let name = flag.name().to_string();
            let reused = old.get(&name).filter(|holder| holder.flag.equal(&flag));
            let holder = match reused {
                Some(existing) => existing.clone(),
                None => {
                    changed = true;
                    Arc::new(FlagHolder::new(flag, self.ticker_interval))
                }
            };
            new_map.insert(name, holder);
        }

        for (name, holder) in old.iter() {
            if !new_map.contains_key(name) {
                holder.ticker.stop();
            }
        }

        if changed {
            self.current.store(Arc::new(new_map));
        }
    }

    /// Stop every holder's ticker. Called from `Flagset::close`.
    pub fn close(&self) {
        for holder in self.current.load().values() {
            holder.ticker.stop();
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(crate::ticker::DEFAULT_TICKER_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::rule_list::RuleListFlag;

    fn flag(name: &str, active: bool) -> Flag {
        Flag::RuleList(RuleListFlag { name: name.into(), active, rules: vec![] })
    }

    #[test]
    fn get_returns_none_before_any_update() {
        let snapshot = Snapshot::default();
        assert!(snapshot.get("missing").is_none());
    }

    #[test]
    fn update_then_get_round_trips() {
        let snapshot = Snapshot::default();
        snapshot.update(vec![flag("a", true)]);
        let holder = snapshot.get("a").expect("a present");
        assert_eq!(holder.flag.name(), "a");
    }

    #[test]
    fn unchanged_flag_preserves_holder_identity_across_refresh() {
        let snapshot = Snapshot::default();
        snapshot.update(vec![flag("a", true), flag("b", true)]);
        let before = snapshot.get("a").unwrap();

        snapshot.update(vec![flag("a", true), flag("b", false)]);
        let after = snapshot.get("a").unwrap();

        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn changed_flag_gets_a_fresh_holder() {
        let snapshot = Snapshot::default();
        snapshot.update(vec![flag("a", true)]);
        let before = snapshot.get("a").unwrap();

        snapshot.update(vec![flag("a", false)]);
        let after = snapshot.get("a").unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.clamp, crate::flag::Clamp::AlwaysOff);
    }

    #[test]
    fn vanished_flag_is_not_present_after_refresh() {
        let snapshot = Snapshot::default();
        snapshot.update(vec![flag("a", true), flag("b", true)]);
        snapshot.update(vec![flag("a", true)]);
        assert!(snapshot.get("b").is_none());
        assert!(snapshot.get("a").is_some());
    }
}
