use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::provider::types::{canonical_team, Position};

use super::index::{compare_ids, IndexEntry, NameIndex};
use super::normalize::normalize_name;

/// Default similarity floor for approximate matches.
pub const DEFAULT_APPROXIMATE_THRESHOLD: f64 = 0.88;

/// How a name was placed in the provider B pool, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Normalized,
    Variant,
    TokenSubset,
    Approximate,
    None,
}

impl MatchMethod {
    pub const ALL: [MatchMethod; 6] = [
        MatchMethod::Exact,
        MatchMethod::Normalized,
        MatchMethod::Variant,
        MatchMethod::TokenSubset,
        MatchMethod::Approximate,
        MatchMethod::None,
    ];

    pub fn base_confidence(&self) -> f64 {
        match self {
            MatchMethod::Exact => 1.0,
            MatchMethod::Normalized => 0.9,
            MatchMethod::Variant => 0.8,
            MatchMethod::TokenSubset => 0.6,
            MatchMethod::Approximate => 0.4,
            MatchMethod::None => 0.0,
        }
    }

    /// Token-subset and approximate matches need corroboration from hints.
    pub fn is_weak(&self) -> bool {
        matches!(self, MatchMethod::TokenSubset | MatchMethod::Approximate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Normalized => "normalized",
            MatchMethod::Variant => "variant",
            MatchMethod::TokenSubset => "token_subset",
            MatchMethod::Approximate => "approximate",
            MatchMethod::None => "none",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match confidence: a pure function of method, halved once on any hint mismatch.
pub fn match_confidence(method: MatchMethod, mismatch: bool) -> f64 {
    let base = method.base_confidence();
    if mismatch {
        base * 0.5
    } else {
        base
    }
}

/// Optional position/team context supplied with a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchHints {
    pub position: Option<Position>,
    pub team: Option<String>,
}

impl MatchHints {
    pub fn new(position: Option<Position>, team: Option<&str>) -> Self {
        Self {
            // Slot markers say nothing about the player's real position
            position: position.filter(Position::is_playable),
            team: team.map(canonical_team).filter(|t| !t.is_empty()),
        }
    }

    fn position_mismatch(&self, entry: &IndexEntry) -> bool {
        match self.position {
            Some(hint) => entry.position.is_playable() && entry.position != hint,
            None => false,
        }
    }

    fn team_mismatch(&self, entry: &IndexEntry) -> bool {
        match (&self.team, &entry.team) {
            (Some(hint), Some(team)) => hint != team,
            _ => false,
        }
    }

    fn agreements(&self, entry: &IndexEntry) -> u8 {
        let position = self.position.is_some_and(|p| p == entry.position);
        let team = matches!((&self.team, &entry.team), (Some(h), Some(t)) if h == t);
        position as u8 + team as u8
    }

    /// Both hints present and both contradicted.
    fn contradicts_both(&self, entry: &IndexEntry) -> bool {
        self.position.is_some()
            && self.team.is_some()
            && self.position_mismatch(entry)
            && self.team_mismatch(entry)
    }
}

/// A resolved cross-provider identity.
///
/// `provider_key` is `None` exactly when `method` is `MatchMethod::None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalIdentity {
    pub provider_key: Option<String>,
    /// Normalized form of the queried name
    pub normalized_name: String,
    pub method: MatchMethod,
    /// Provider B's full name for the matched player
    pub matched_name: Option<String>,
    pub position_mismatch: bool,
    pub team_mismatch: bool,
    /// Pool snapshot the match was made against
    pub index_version: u64,
}

impl CanonicalIdentity {
    pub fn unmatched(normalized_name: String, index_version: u64) -> Self {
        Self {
            provider_key: None,
            normalized_name,
            method: MatchMethod::None,
            matched_name: None,
            position_mismatch: false,
            team_mismatch: false,
            index_version,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.provider_key.is_some()
    }

    pub fn has_mismatch(&self) -> bool {
        self.position_mismatch || self.team_mismatch
    }

    pub fn confidence(&self) -> f64 {
        match_confidence(self.method, self.has_mismatch())
    }
}

/// Resolves provider A names against one provider B name index.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    index: Arc<NameIndex>,
    approximate_threshold: f64,
}

impl IdentityResolver {
    pub fn new(index: Arc<NameIndex>) -> Self {
        Self {
            index,
            approximate_threshold: DEFAULT_APPROXIMATE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.approximate_threshold = threshold;
        self
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Place `name` in the pool, stopping at the first method that hits.
    pub fn resolve(&self, name: &str, hints: &MatchHints) -> CanonicalIdentity {
        let lowered = name.trim().to_lowercase();
        let normalized = normalize_name(name);
        let version = self.index.version();

        if normalized.is_empty() {
            debug!("resolve '{}': empty after normalization", name);
            return CanonicalIdentity::unmatched(normalized, version);
        }

        let found = self
            .pick(self.index.exact(&lowered), hints, false)
            .map(|e| (e, MatchMethod::Exact))
            .or_else(|| {
                self.pick(self.index.normalized(&normalized), hints, false)
                    .map(|e| (e, MatchMethod::Normalized))
            })
            .or_else(|| {
                self.pick(self.index.variant(&normalized), hints, false)
                    .map(|e| (e, MatchMethod::Variant))
            })
            .or_else(|| {
                self.pick(self.token_subset(&normalized), hints, true)
                    .map(|e| (e, MatchMethod::TokenSubset))
            })
            .or_else(|| self.approximate(&normalized, hints).map(|e| (e, MatchMethod::Approximate)));

        let Some((entry, method)) = found else {
            debug!("resolve '{}' -> '{}': no match", name, normalized);
            return CanonicalIdentity::unmatched(normalized, version);
        };

        debug!(
            "resolve '{}' -> '{}': {} match {} ({})",
            name, normalized, method, entry.id, entry.full_name
        );

        CanonicalIdentity {
            provider_key: Some(entry.id.clone()),
            normalized_name: normalized,
            method,
            matched_name: Some(entry.full_name.clone()),
            position_mismatch: hints.position_mismatch(entry),
            team_mismatch: hints.team_mismatch(entry),
            index_version: version,
        }
    }

    /// Choose among candidates sharing a key: hint agreement, then active,
    /// then lowest provider id. Weak steps drop candidates contradicting
    /// both hints.
    fn pick<'a>(
        &self,
        candidates: Vec<&'a IndexEntry>,
        hints: &MatchHints,
        weak: bool,
    ) -> Option<&'a IndexEntry> {
        candidates
            .into_iter()
            .filter(|e| !weak || !hints.contradicts_both(e))
            .min_by(|a, b| {
                let mismatches = |e: &IndexEntry| {
                    hints.position_mismatch(e) as u8 + hints.team_mismatch(e) as u8
                };
                mismatches(a)
                    .cmp(&mismatches(b))
                    .then_with(|| hints.agreements(b).cmp(&hints.agreements(a)))
                    .then_with(|| b.active.cmp(&a.active))
                    .then_with(|| compare_ids(&a.id, &b.id))
            })
    }

    fn token_subset(&self, normalized: &str) -> Vec<&IndexEntry> {
        let query: Vec<&str> = normalized.split(' ').collect();
        self.index
            .entries()
            .filter(|e| query.iter().all(|q| e.tokens.iter().any(|t| t == q)))
            .collect()
    }

    /// Nearest neighbour by normalized Levenshtein similarity, restricted to
    /// entries whose last token shares the query's last-token initial.
    fn approximate(&self, normalized: &str, hints: &MatchHints) -> Option<&IndexEntry> {
        let initial = normalized.rsplit(' ').next()?.chars().next()?;
        let scored: Vec<(f64, &IndexEntry)> = self
            .index
            .with_last_initial(initial)
            .into_iter()
            .map(|e| (strsim::normalized_levenshtein(normalized, &e.normalized), e))
            .filter(|(score, _)| *score >= self.approximate_threshold)
            .collect();

        let best = scored
            .iter()
            .map(|(score, _)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let top: Vec<&IndexEntry> = scored
            .into_iter()
            .filter(|(score, _)| (*score - best).abs() < 1e-9)
            .map(|(_, e)| e)
            .collect();

        self.pick(top, hints, true)
    }
}
