use serde::Serialize;

use super::config::{FusionConfig, ScoringConfig};
use super::tier::health_factor;
use crate::provider::types::Position;

#[derive(Debug, Clone, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Projection", "Matchup", "Health"
    pub description: String, // e.g. "21.0 pts of 25 max (84/100) x0.80"
    pub before: f64,         // Score before this factor
    pub after: f64,          // Score after this factor
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub incomplete: bool,
    pub breakdown: ScoreBreakdown,
}

/// Signals feeding the decision score for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInputs<'a> {
    pub position: Position,
    pub composite: f64,
    pub matchup_score: u8,
    pub trending_adds: u64,
    pub momentum: f64,
    pub injury_status: Option<&'a str>,
    /// Some enrichment step fell back to defaults
    pub degraded: bool,
}

/// Weekly points that count as a perfect projection at each position.
pub fn max_projection(position: Position) -> f64 {
    match position {
        Position::Qb => 30.0,
        Position::Rb => 25.0,
        Position::Wr => 22.0,
        Position::Te => 18.0,
        Position::K | Position::Def => 12.0,
        _ => 20.0,
    }
}

/// Final 0-100 decision score.
///
/// The fused projection (normalized against the position max) carries the
/// fusion weight; matchup, trending and momentum share the rest; injury
/// status then scales the total.
pub fn calculate_score(
    inputs: &DecisionInputs<'_>,
    fusion: &FusionConfig,
    config: &ScoringConfig,
) -> ScoreResult {
    let base_score = 0.0;
    let mut score = base_score;
    let mut factors = Vec::new();
    let mut incomplete = inputs.degraded;

    let mut add = |label: &str, description: String, delta: f64, score: &mut f64| {
        let before = *score;
        *score += delta;
        factors.push(FactorContribution {
            label: label.to_string(),
            description,
            before,
            after: *score,
        });
    };

    // Projection
    let max_proj = max_projection(inputs.position);
    let composite = if inputs.composite.is_finite() { inputs.composite.max(0.0) } else { 0.0 };
    if composite <= 0.0 {
        incomplete = true;
    }
    let projection_norm = (composite / max_proj * 100.0).min(100.0);
    let projection_weight = fusion.total_weight();
    add(
        "Projection",
        format!(
            "{:.1} pts of {:.0} max ({:.0}/100) x{:.2}",
            composite, max_proj, projection_norm, projection_weight
        ),
        projection_norm * projection_weight,
        &mut score,
    );

    // Matchup
    let matchup_weight = config.matchup_weight();
    add(
        "Matchup",
        format!("{}/100 x{:.2}", inputs.matchup_score, matchup_weight),
        inputs.matchup_score as f64 * matchup_weight,
        &mut score,
    );

    // Trending adds
    let trending_scale = config.trending_scale();
    let trending_norm = if trending_scale > 0.0 {
        (inputs.trending_adds as f64 / trending_scale * 100.0).min(100.0)
    } else {
        0.0
    };
    let trending_weight = config.trending_weight();
    add(
        "Trending",
        format!("{} adds ({:.0}/100) x{:.2}", inputs.trending_adds, trending_norm, trending_weight),
        trending_norm * trending_weight,
        &mut score,
    );

    // Momentum
    let momentum = inputs.momentum.clamp(0.0, 100.0);
    let momentum_weight = config.momentum_weight();
    add(
        "Momentum",
        format!("{:.0}/100 x{:.2}", momentum, momentum_weight),
        momentum * momentum_weight,
        &mut score,
    );

    // Health multiplies everything above
    let health = health_factor(inputs.injury_status);
    let before = score;
    score *= health;
    factors.push(FactorContribution {
        label: "Health".to_string(),
        description: format!("{} -> x{}", inputs.injury_status.unwrap_or("healthy"), health),
        before,
        after: score,
    });

    ScoreResult {
        score: score.max(0.0),
        incomplete,
        breakdown: ScoreBreakdown {
            base_score,
            factors,
        },
    }
}
