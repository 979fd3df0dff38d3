use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::provider::types::Position;

/// Pool size per position at which this week's distribution replaces the
/// fixed thresholds.
pub const DYNAMIC_TIER_MIN_PLAYERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Elite,
    Stud,
    Solid,
    Flex,
    Bench,
    Unknown,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Elite => "elite",
            Tier::Stud => "stud",
            Tier::Solid => "solid",
            Tier::Flex => "flex",
            Tier::Bench => "bench",
            Tier::Unknown => "unknown",
        }
    }

    /// Elite and stud players are expected to start every week.
    pub fn is_must_start(&self) -> bool {
        matches!(self, Tier::Elite | Tier::Stud)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum composite projection for each tier at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub elite: f64,
    pub stud: f64,
    pub solid: f64,
    pub flex: f64,
}

impl TierThresholds {
    pub fn fixed(position: Position) -> Option<Self> {
        let t = |elite, stud, solid, flex| TierThresholds { elite, stud, solid, flex };
        match position {
            Position::Qb => Some(t(22.0, 18.0, 15.0, 12.0)),
            Position::Rb => Some(t(18.0, 14.0, 10.0, 7.0)),
            Position::Wr => Some(t(16.0, 12.0, 9.0, 6.0)),
            Position::Te => Some(t(12.0, 9.0, 6.0, 4.0)),
            Position::K => Some(t(10.0, 8.0, 6.0, 5.0)),
            Position::Def => Some(t(10.0, 8.0, 6.0, 4.0)),
            _ => None,
        }
    }

    /// 90th/75th/50th/25th percentiles of `projections`, or `None` when the
    /// sample is smaller than [`DYNAMIC_TIER_MIN_PLAYERS`].
    pub fn from_distribution(projections: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = projections
            .iter()
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        if sorted.len() < DYNAMIC_TIER_MIN_PLAYERS {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            elite: percentile(&sorted, 90.0),
            stud: percentile(&sorted, 75.0),
            solid: percentile(&sorted, 50.0),
            flex: percentile(&sorted, 25.0),
        })
    }

    pub fn classify(&self, projection: f64) -> Tier {
        if projection >= self.elite {
            Tier::Elite
        } else if projection >= self.stud {
            Tier::Stud
        } else if projection >= self.solid {
            Tier::Solid
        } else if projection >= self.flex {
            Tier::Flex
        } else {
            Tier::Bench
        }
    }
}

/// Linear-interpolated percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Per-position tier thresholds for one request.
#[derive(Debug, Clone, Default)]
pub struct TierTable {
    dynamic: HashMap<Position, TierThresholds>,
}

impl TierTable {
    /// Build from this week's composite projections grouped by position.
    pub fn from_pool(by_position: &HashMap<Position, Vec<f64>>) -> Self {
        let dynamic = by_position
            .iter()
            .filter_map(|(position, projections)| {
                TierThresholds::from_distribution(projections).map(|t| (*position, t))
            })
            .collect();
        Self { dynamic }
    }

    pub fn thresholds(&self, position: Position) -> Option<TierThresholds> {
        self.dynamic
            .get(&position)
            .copied()
            .or_else(|| TierThresholds::fixed(position))
    }

    pub fn is_dynamic(&self, position: Position) -> bool {
        self.dynamic.contains_key(&position)
    }

    pub fn classify(&self, projection: f64, position: Position) -> Tier {
        if !(projection.is_finite() && projection > 0.0) {
            return Tier::Unknown;
        }
        match self.thresholds(position) {
            Some(thresholds) => thresholds.classify(projection),
            None => Tier::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
    Out,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::Moderate => "moderate",
            RiskLabel::High => "high",
            RiskLabel::Out => "out",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Injury status as reported by either provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Healthy,
    Questionable,
    Doubtful,
    Out,
    Unrecognized,
}

fn classify_status(status: Option<&str>) -> Health {
    let Some(status) = status.map(|s| s.trim().to_ascii_uppercase()) else {
        return Health::Healthy;
    };
    match status.as_str() {
        "" | "ACTIVE" | "HEALTHY" | "NONE" | "PROBABLE" | "P" => Health::Healthy,
        "Q" | "QUESTIONABLE" | "GTD" | "DTD" => Health::Questionable,
        "D" | "DOUBTFUL" => Health::Doubtful,
        "O" | "OUT" | "IR" | "IR+" | "PUP" | "NA" | "SUSP" | "SUSPENDED" | "INACTIVE" | "COV"
        | "IR-R" | "IR-NFI" | "NFI" => Health::Out,
        _ => Health::Unrecognized,
    }
}

pub fn risk_label(status: Option<&str>) -> RiskLabel {
    match classify_status(status) {
        Health::Healthy => RiskLabel::Low,
        Health::Questionable | Health::Unrecognized => RiskLabel::Moderate,
        Health::Doubtful => RiskLabel::High,
        Health::Out => RiskLabel::Out,
    }
}

/// Multiplier applied to the decision score for injury status.
pub fn health_factor(status: Option<&str>) -> f64 {
    match classify_status(status) {
        Health::Healthy => 1.0,
        Health::Questionable => 0.7,
        Health::Unrecognized => 0.8,
        Health::Doubtful => 0.3,
        Health::Out => 0.0,
    }
}
