use serde::{Deserialize, Serialize};

/// Signal fusion tuning.
///
/// Every field is optional; accessors fall back to the built-in defaults.
///
/// Example YAML:
/// ```yaml
/// fusion:
///   provider_a_weight: 0.4
///   provider_b_weight: 0.4
///   min_weight: 0.1
///   max_weight: 0.7
///   floor_ratio: 0.75
///   ceiling_ratio: 1.25
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FusionConfig {
    /// Base weight of the roster provider's projection (default: 0.4)
    #[serde(default)]
    pub provider_a_weight: Option<f64>,

    /// Base weight of the pool provider's projection before confidence scaling (default: 0.4)
    #[serde(default)]
    pub provider_b_weight: Option<f64>,

    /// Lower clamp applied to each weight before renormalizing (default: 0.1)
    #[serde(default)]
    pub min_weight: Option<f64>,

    /// Upper clamp applied to each weight before renormalizing (default: 0.7)
    #[serde(default)]
    pub max_weight: Option<f64>,

    /// Floor as a fraction of composite without score history (default: 0.75)
    #[serde(default)]
    pub floor_ratio: Option<f64>,

    /// Ceiling as a fraction of composite without score history (default: 1.25)
    #[serde(default)]
    pub ceiling_ratio: Option<f64>,

    /// Standard deviations below composite for the history-based floor (default: 0.8)
    #[serde(default)]
    pub floor_sigma: Option<f64>,

    /// Standard deviations above composite for the history-based ceiling (default: 1.2)
    #[serde(default)]
    pub ceiling_sigma: Option<f64>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            provider_a_weight: Some(0.4),
            provider_b_weight: Some(0.4),
            min_weight: Some(0.1),
            max_weight: Some(0.7),
            floor_ratio: Some(0.75),
            ceiling_ratio: Some(1.25),
            floor_sigma: Some(0.8),
            ceiling_sigma: Some(1.2),
        }
    }
}

impl FusionConfig {
    pub fn provider_a_weight(&self) -> f64 {
        self.provider_a_weight.unwrap_or(0.4)
    }

    pub fn provider_b_weight(&self) -> f64 {
        self.provider_b_weight.unwrap_or(0.4)
    }

    /// Combined projection weight; the rest is reserved for the decision score.
    pub fn total_weight(&self) -> f64 {
        self.provider_a_weight() + self.provider_b_weight()
    }

    pub fn min_weight(&self) -> f64 {
        self.min_weight.unwrap_or(0.1)
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight.unwrap_or(0.7)
    }

    pub fn floor_ratio(&self) -> f64 {
        self.floor_ratio.unwrap_or(0.75)
    }

    pub fn ceiling_ratio(&self) -> f64 {
        self.ceiling_ratio.unwrap_or(1.25)
    }

    pub fn floor_sigma(&self) -> f64 {
        self.floor_sigma.unwrap_or(0.8)
    }

    pub fn ceiling_sigma(&self) -> f64 {
        self.ceiling_sigma.unwrap_or(1.2)
    }
}

/// Decision-score weights for the signals outside the fused projection.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   matchup_weight: 0.10
///   trending_weight: 0.05
///   momentum_weight: 0.05
///   trending_scale: 10000
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight of the 1-100 matchup score (default: 0.10)
    #[serde(default)]
    pub matchup_weight: Option<f64>,

    /// Weight of trending adds (default: 0.05)
    #[serde(default)]
    pub trending_weight: Option<f64>,

    /// Weight of the 0-100 momentum score (default: 0.05)
    #[serde(default)]
    pub momentum_weight: Option<f64>,

    /// Add count that maps to a full trending score of 100 (default: 10000)
    #[serde(default)]
    pub trending_scale: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            matchup_weight: Some(0.10),
            trending_weight: Some(0.05),
            momentum_weight: Some(0.05),
            trending_scale: Some(10_000.0),
        }
    }
}

impl ScoringConfig {
    pub fn matchup_weight(&self) -> f64 {
        self.matchup_weight.unwrap_or(0.10)
    }

    pub fn trending_weight(&self) -> f64 {
        self.trending_weight.unwrap_or(0.05)
    }

    pub fn momentum_weight(&self) -> f64 {
        self.momentum_weight.unwrap_or(0.05)
    }

    pub fn trending_scale(&self) -> f64 {
        self.trending_scale.unwrap_or(10_000.0)
    }
}
