//! Deterministic SHA-1 based hashing for percentage rollouts.
//!
//! Both flag variants need "same inputs -> same bucket, forever, across
//! processes and restarts." Neither use is a security boundary: SHA-1 is
//! chosen for distribution, not secrecy (see the crate's non-goals).

use sha1::{Digest, Sha1};

/// Rate-rule hash (Variant A, §4.2.1).
///
/// `properties` must already be sorted by property name; this function does
/// not sort them, since the caller (rule evaluation) is the one with the
/// missing-property error to report before it gets here.
///
/// Buffer layout: `flag_name` followed by, for each property in order,
/// a single `0x00` byte then the property's value.
pub fn rate_hash_fraction(flag_name: &str, sorted_values: &[&str]) -> f64 {
    let mut hasher = Sha1::new();
    hasher.update(flag_name.as_bytes());
    for value in sorted_values {
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
    }
    let digest = hasher.finalize();
    let x = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (x as f64) / (u32::MAX as f64 + 1.0)
}

/// Predicate-rule hash (Variant B, §4.3 step 3).
///
/// Buffer layout: `seed`, a literal `.`, then `attribute_value`. Takes the
/// first two bytes of the digest as a big-endian `u16` and normalizes to
/// `[0, 1)`.
pub fn predicate_hash_fraction(seed: &str, attribute_value: &str) -> f64 {
    let mut hasher = Sha1::new();
    hasher.update(seed.as_bytes());
    hasher.update(b".");
    hasher.update(attribute_value.as_bytes());
    let digest = hasher.finalize();
    let x = u16::from_be_bytes([digest[0], digest[1]]);
    (x as f64) / (u16::MAX as f64 + 1.0)
}
