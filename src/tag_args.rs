//! The variadic tag-argument ergonomics layered over the core merge
//! algorithm in `Flagset::enabled` (§4.5, §1 "tag-argument variadic
//! ergonomics" — a non-core, purely ergonomic seam).
//!
//! The core merge algorithm itself (ordering, duplicate-key handling,
//! `InvalidTagList` on malformed input) lives in [`crate::flagset`]; this
//! module only converts caller-friendly shapes into a `TagMap` or a
//! parse error.

use crate::error::FlagError;
use crate::tags::TagMap;

/// Anything that can be turned into merged request tags at a call site.
pub trait IntoTags {
    fn into_tags(self) -> Result<TagMap, FlagError>;
}

impl IntoTags for TagMap {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        Ok(self)
    }
}

impl IntoTags for &TagMap {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        Ok(self.clone())
    }
}

impl<const N: usize> IntoTags for [(&str, &str); N] {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        Ok(self.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

impl IntoTags for &[(&str, &str)] {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        Ok(self.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

/// Alternating `key, value` string tokens, the other documented calling
/// convention (`enabled(name, &["host", "apibox_123", "cluster", "nw"])`).
/// An odd-length token list is an `InvalidTagList` error, not a panic.
pub struct AlternatingPairs<'a>(pub &'a [&'a str]);

impl<'a> IntoTags for AlternatingPairs<'a> {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        if self.0.len() % 2 != 0 {
            return Err(FlagError::InvalidTagList {
                detail: format!("odd number of tokens ({})", self.0.len()),
            });
        }
        let mut tags = TagMap::new();
        for pair in self.0.chunks(2) {
            tags.insert(pair[0].to_string(), pair[1].to_string());
        }
        Ok(tags)
    }
}

impl IntoTags for () {
    fn into_tags(self) -> Result<TagMap, FlagError> {
        Ok(TagMap::new())
    }
}
