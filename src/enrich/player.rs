use serde::Serialize;
use std::fmt;

use crate::identity::{CanonicalIdentity, MatchMethod};
use crate::provider::types::{PlayerRecord, Position};
use crate::scoring::{FusedProjection, MatchupScore, PositionValue, RiskLabel, ScoreResult, Tier};

/// Why a player's view fell back to partial or neutral data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// No provider B identity; provider A data only
    Unmatched,
    /// Identity found but a position/team hint disagreed
    HintMismatch,
    /// Provider B projection lookup failed or was skipped
    ProjectionUnavailable,
    /// Neither provider had a usable projection
    NoProjection,
    /// No defensive ranking for this opponent and position
    MatchupUnavailable,
    /// Trending feed could not be fetched
    TrendingUnavailable,
}

impl DegradedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradedReason::Unmatched => "unmatched",
            DegradedReason::HintMismatch => "hint mismatch",
            DegradedReason::ProjectionUnavailable => "projection unavailable",
            DegradedReason::NoProjection => "no projection",
            DegradedReason::MatchupUnavailable => "matchup unavailable",
            DegradedReason::TrendingUnavailable => "trending unavailable",
        }
    }
}

impl fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fused decision view of one rostered player.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPlayer {
    pub record: PlayerRecord,
    pub identity: CanonicalIdentity,
    pub confidence: f64,
    pub provider_b_projection: Option<f64>,
    /// Injury status from provider A, else from the provider B pool
    pub injury_status: Option<String>,
    pub fused: FusedProjection,
    pub matchup: MatchupScore,
    pub value: PositionValue,
    pub tier: Tier,
    pub risk: RiskLabel,
    pub momentum: f64,
    pub consistency: f64,
    pub trending_adds: u64,
    pub trending_drops: u64,
    pub decision: ScoreResult,
    pub degraded: Vec<DegradedReason>,
}

impl EnrichedPlayer {
    pub fn name(&self) -> &str {
        &self.record.display_name
    }

    pub fn position(&self) -> Position {
        self.record.position
    }

    pub fn composite(&self) -> f64 {
        self.fused.composite
    }

    pub fn decision_score(&self) -> f64 {
        self.decision.score
    }

    pub fn is_matched(&self) -> bool {
        self.identity.method != MatchMethod::None
    }

    pub fn has_projection(&self) -> bool {
        self.record.projection.is_some() || self.provider_b_projection.is_some()
    }

    pub fn has_both_projections(&self) -> bool {
        self.record.projection.is_some() && self.provider_b_projection.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::identity::MatchMethod;
    use crate::scoring::engine::DecisionInputs;
    use crate::scoring::{calculate_score, fuse, normalize, FusionConfig, MatchupScore, ScoringConfig, TierTable};

    /// A fully matched, healthy player whose projections both equal `composite`.
    pub(crate) fn player(name: &str, position: Position, composite: f64) -> EnrichedPlayer {
        let mut record = PlayerRecord::new(name, position, "KC");
        record.projection = Some(composite);
        let identity = CanonicalIdentity {
            provider_key: Some(format!("id-{}", name)),
            normalized_name: name.to_lowercase(),
            method: MatchMethod::Exact,
            matched_name: Some(name.to_string()),
            position_mismatch: false,
            team_mismatch: false,
            index_version: 1,
        };
        let fused = fuse(1.0, Some(composite), Some(composite));
        let matchup = MatchupScore::unknown();
        let decision = calculate_score(
            &DecisionInputs {
                position,
                composite,
                matchup_score: matchup.score,
                trending_adds: 0,
                momentum: 50.0,
                injury_status: None,
                degraded: false,
            },
            &FusionConfig::default(),
            &ScoringConfig::default(),
        );
        EnrichedPlayer {
            record,
            confidence: 1.0,
            identity,
            provider_b_projection: Some(composite),
            injury_status: None,
            fused,
            matchup,
            value: normalize(composite, position),
            tier: TierTable::default().classify(composite, position),
            risk: RiskLabel::Low,
            momentum: 50.0,
            consistency: 50.0,
            trending_adds: 0,
            trending_drops: 0,
            decision,
            degraded: Vec::new(),
        }
    }
}
