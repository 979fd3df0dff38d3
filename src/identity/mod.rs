//! Cross-provider player identity: name normalization, the per-snapshot
//! name index, and the resolver that places provider A names in the
//! provider B pool.

pub mod index;
pub mod normalize;
pub mod resolver;

pub use index::{IndexEntry, NameIndex};
pub use normalize::{normalize_name, variant_forms};
pub use resolver::{
    match_confidence, CanonicalIdentity, IdentityResolver, MatchHints, MatchMethod,
    DEFAULT_APPROXIMATE_THRESHOLD,
};
