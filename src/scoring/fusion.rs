use serde::Serialize;

use super::config::FusionConfig;
use super::form::volatility;

/// Composite projection with its range and the weights that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusedProjection {
    pub composite: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub weight_a: f64,
    pub weight_b: f64,
    /// Standard deviation of recent scores when the range came from history
    pub volatility: Option<f64>,
}

impl FusedProjection {
    pub fn zero(weight_a: f64, weight_b: f64) -> Self {
        Self {
            composite: 0.0,
            floor: 0.0,
            ceiling: 0.0,
            weight_a,
            weight_b,
            volatility: None,
        }
    }
}

/// Provider weights for a given identity confidence.
///
/// Provider B's base weight is scaled by `confidence`, the lost share moves
/// to provider A, each weight is clamped, and the pair is rescaled so it
/// sums to the configured total.
pub fn fusion_weights(config: &FusionConfig, confidence: f64) -> (f64, f64) {
    let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };
    let base_a = config.provider_a_weight();
    let base_b = config.provider_b_weight();

    let raw_b = base_b * confidence;
    let raw_a = base_a + (base_b - raw_b);

    let (lo, hi) = (config.min_weight(), config.max_weight());
    let a = raw_a.clamp(lo, hi);
    let b = raw_b.clamp(lo, hi);

    let sum = a + b;
    if sum <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = config.total_weight() / sum;
    (a * scale, b * scale)
}

fn present(projection: Option<f64>) -> Option<f64> {
    projection.filter(|p| p.is_finite() && *p > 0.0)
}

/// Fuse two projections with the default configuration and no score history.
pub fn fuse(confidence: f64, proj_a: Option<f64>, proj_b: Option<f64>) -> FusedProjection {
    fuse_with(&FusionConfig::default(), confidence, proj_a, proj_b, &[])
}

/// Fuse two projections into a composite with floor and ceiling.
///
/// Zero, negative or missing projections drop out and the composite falls
/// back to the other provider. With three or more recent scores the range
/// is composite - floor_sigma * sd and composite + ceiling_sigma * sd.
pub fn fuse_with(
    config: &FusionConfig,
    confidence: f64,
    proj_a: Option<f64>,
    proj_b: Option<f64>,
    recent_scores: &[f64],
) -> FusedProjection {
    let (weight_a, weight_b) = fusion_weights(config, confidence);

    let composite = match (present(proj_a), present(proj_b)) {
        (Some(a), Some(b)) => {
            let total = weight_a + weight_b;
            if total > 0.0 {
                (weight_a * a + weight_b * b) / total
            } else {
                (a + b) / 2.0
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return FusedProjection::zero(weight_a, weight_b),
    };

    let sd = volatility(recent_scores);
    let (floor, ceiling) = match sd {
        Some(sd) => (
            (composite - config.floor_sigma() * sd).max(0.0),
            composite + config.ceiling_sigma() * sd,
        ),
        None => (
            composite * config.floor_ratio(),
            composite * config.ceiling_ratio(),
        ),
    };

    FusedProjection {
        composite,
        floor: floor.min(composite),
        ceiling: ceiling.max(composite),
        weight_a,
        weight_b,
        volatility: sd,
    }
}
