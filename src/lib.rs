//! flagset — an embeddable feature-flag evaluation engine.
//!
//! Applications call a single hot-path query — "is flag F enabled for
//! this request, given these tags?" — against a lock-free snapshot that a
//! background refresh loop keeps current from a pluggable [`Backend`].
//! Flag definitions express sampling rates, allow/deny lists, and
//! multi-rule logic over request attributes; percentage-based rollouts
//! are deterministic for a given attribute value via SHA-1 hashing.
//!
//! The evaluator is [`Flagset`]; construct one with a [`Backend`] and a
//! [`FlagsetOptions`] bag, then call [`Flagset::enabled`] from as many
//! threads as you like. A process-global convenience wrapper lives in
//! [`global`] for applications that want a single shared evaluator
//! reachable without threading an instance through every call site.

pub mod age;
pub mod backend;
pub mod callbacks;
mod clock;
pub mod error;
pub mod flag;
pub mod flagset;
pub mod global;
mod hashing;
pub mod holder;
pub mod options;
pub mod overrides;
pub mod rand_source;
mod snapshot;
pub mod statsd;
pub mod tag_args;
pub mod tags;
mod throttle;
mod ticker;

pub use backend::Backend;
pub use error::{Critical, FlagError};
pub use flag::{Clamp, Flag};
pub use flagset::Flagset;
pub use options::FlagsetOptions;
pub use overrides::Context;
pub use tag_args::IntoTags;
pub use tags::TagMap;
