use serde::Serialize;

use crate::provider::types::Position;

/// Weekly scoring distribution and thresholds for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionProfile {
    pub mean: f64,
    pub std_dev: f64,
    /// Replacement level: the last starter-worthy weekly projection
    pub starter_threshold: f64,
    pub elite_threshold: f64,
    pub scarcity: f64,
}

/// Profile for an unrecognized position: raw projection passes through.
const GENERIC_STARTER: f64 = 7.0;
const GENERIC_ELITE: f64 = 15.0;

/// Flex values closer than this fall back to raw projection.
pub const FLEX_TIE_MARGIN: f64 = 0.3;

pub fn profile(position: Position) -> Option<PositionProfile> {
    let p = |mean, std_dev, starter_threshold, elite_threshold, scarcity| PositionProfile {
        mean,
        std_dev,
        starter_threshold,
        elite_threshold,
        scarcity,
    };
    match position {
        Position::Qb => Some(p(18.0, 6.0, 15.0, 22.0, 1.0)),
        Position::Rb => Some(p(11.0, 5.0, 8.0, 15.0, 1.0)),
        Position::Wr => Some(p(10.0, 4.5, 7.0, 14.0, 0.95)),
        // TE12 replacement level is 5.0 in the usual table. Raised to 8.5 so
        // the scarcity premium cannot lift a TE over an RB with equal points.
        Position::Te => Some(p(7.0, 3.5, 8.5, 10.0, 1.05)),
        Position::K => Some(p(8.0, 3.0, 6.0, 10.0, 1.0)),
        Position::Def => Some(p(8.0, 4.0, 6.0, 12.0, 1.0)),
        _ => None,
    }
}

/// Position-relative view of one projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionValue {
    pub z_score: f64,
    pub percentile: f64,
    pub value_over_replacement: f64,
    pub flex_value: f64,
    pub is_starter_worthy: bool,
    pub is_elite: bool,
}

pub fn z_score(projection: f64, position: Position) -> f64 {
    match profile(position) {
        Some(p) => (projection - p.mean) / p.std_dev,
        None => 0.0,
    }
}

/// 0.3 * scarcity * (projection - replacement) + 0.7 * projection.
pub fn flex_value(projection: f64, position: Position) -> f64 {
    match profile(position) {
        Some(p) => 0.3 * p.scarcity * (projection - p.starter_threshold) + 0.7 * projection,
        None => projection,
    }
}

pub fn normalize(projection: f64, position: Position) -> PositionValue {
    let projection = if projection.is_finite() { projection } else { 0.0 };
    let z = z_score(projection, position);
    let (starter, elite) = profile(position)
        .map(|p| (p.starter_threshold, p.elite_threshold))
        .unwrap_or((GENERIC_STARTER, GENERIC_ELITE));

    PositionValue {
        z_score: z,
        percentile: (50.0 + z * 33.3).clamp(0.0, 100.0),
        value_over_replacement: projection - starter,
        flex_value: flex_value(projection, position),
        is_starter_worthy: projection >= starter,
        is_elite: projection >= elite,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlexPick {
    A,
    B,
}

/// Pick the better FLEX play. Near-ties go to the higher raw projection,
/// exact ties to A.
pub fn compare_for_flex(a: (f64, Position), b: (f64, Position)) -> FlexPick {
    let flex_a = flex_value(a.0, a.1);
    let flex_b = flex_value(b.0, b.1);

    let a_wins = if (flex_a - flex_b).abs() < FLEX_TIE_MARGIN {
        a.0 >= b.0
    } else {
        flex_a > flex_b
    };
    if a_wins {
        FlexPick::A
    } else {
        FlexPick::B
    }
}

/// Human-readable breakdown of a FLEX comparison.
pub fn explain_comparison(a: (f64, Position, &str), b: (f64, Position, &str)) -> String {
    let pick = compare_for_flex((a.0, a.1), (b.0, b.1));
    let winner = match pick {
        FlexPick::A => a.2,
        FlexPick::B => b.2,
    };
    let close = (flex_value(a.0, a.1) - flex_value(b.0, b.1)).abs() < FLEX_TIE_MARGIN;

    let describe = |(projection, position, name): (f64, Position, &str)| {
        let value = normalize(projection, position);
        format!(
            "{} ({}):\n  Projection: {:.1} points\n  Position percentile: {:.0}th\n  Normalized score: {:+.2} ({} average)\n  FLEX value: {:.1}\n",
            name,
            position,
            projection,
            value.percentile,
            value.z_score,
            if value.z_score > 0.0 { "above" } else { "below" },
            value.flex_value,
        )
    };

    format!(
        "FLEX comparison: {} ({}) vs {} ({})\n\n{}\n{}\nWinner: {}\nReason: {}\n",
        a.2,
        a.1,
        b.2,
        b.1,
        describe(a),
        describe(b),
        winner,
        if close {
            "higher raw projection (FLEX values within 0.3)"
        } else {
            "higher FLEX value after position scarcity"
        }
    )
}
