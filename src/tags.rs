//! Request tags: the per-call attributes flags are evaluated against.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// A flat string->string attribute map. Cheap to clone (it's an `Arc` under
/// the hood via [`DefaultTags`]; caller-supplied maps are plain `HashMap`s).
pub type TagMap = HashMap<String, String>;

/// The evaluator's atomically-swappable set of default tags.
///
/// Merged under caller-supplied tags on every `enabled()` call: caller
/// values win on key collision (§8, "Default-tag precedence").
pub struct DefaultTags {
    inner: ArcSwap<TagMap>,
}

impl DefaultTags {
    pub fn new(initial: TagMap) -> Self {
        Self { inner: ArcSwap::from_pointee(initial) }
    }

    pub fn load(&self) -> Arc<TagMap> {
        self.inner.load_full()
    }

    /// Replace the default tags wholesale.
    pub fn set(&self, tags: TagMap) {
        self.inner.store(Arc::new(tags));
    }

    /// Merge `additional` into the current default tags (`additional` wins
    /// on key collision) and publish the result.
    pub fn add(&self, additional: TagMap) {
        let mut merged = (*self.inner.load_full()).clone();
        merged.extend(additional);
        self.inner.store(Arc::new(merged));
    }
}

impl Default for DefaultTags {
    fn default() -> Self {
        Self::new(TagMap::new())
    }
}

/// Merge default tags under caller tags: caller wins on collision.
pub fn merge(defaults: &TagMap, caller: &TagMap) -> TagMap {
    let mut merged = defaults.clone();
    merged.extend(caller.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Look up an attribute, checking caller (merged) tags first, then default
/// tags — the precedence rule used by Variant-B predicates (§4.3.1) and by
/// the `hash_by`-presence check (§4.3 step 1, resolved open question in §9).
pub fn lookup_with_default_fallback<'a>(
    merged: &'a TagMap,
    defaults: &'a TagMap,
    attribute: &str,
) -> Option<&'a str> {
    merged
        .get(attribute)
        .or_else(|| defaults.get(attribute))
        .map(|s| s.as_str())
}
