use serde::Serialize;
use std::fmt;

use crate::provider::types::{canonical_team, DefenseTable, Position};

/// Logistic steepness applied to the rank percentile.
pub const MATCHUP_STEEPNESS: f64 = 0.05;

/// Score returned whenever ranking data is missing.
pub const NEUTRAL_SCORE: u8 = 50;

/// Ten matchup buckets, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupTier {
    SmashSpot,
    Elite,
    Great,
    Good,
    Neutral,
    BelowAverage,
    Tough,
    Bad,
    Terrible,
    Avoid,
}

impl MatchupTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => MatchupTier::SmashSpot,
            80..=89 => MatchupTier::Elite,
            70..=79 => MatchupTier::Great,
            60..=69 => MatchupTier::Good,
            50..=59 => MatchupTier::Neutral,
            40..=49 => MatchupTier::BelowAverage,
            30..=39 => MatchupTier::Tough,
            20..=29 => MatchupTier::Bad,
            10..=19 => MatchupTier::Terrible,
            _ => MatchupTier::Avoid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchupTier::SmashSpot => "smash spot",
            MatchupTier::Elite => "elite matchup",
            MatchupTier::Great => "great matchup",
            MatchupTier::Good => "good matchup",
            MatchupTier::Neutral => "neutral matchup",
            MatchupTier::BelowAverage => "below average matchup",
            MatchupTier::Tough => "tough matchup",
            MatchupTier::Bad => "bad matchup",
            MatchupTier::Terrible => "terrible matchup",
            MatchupTier::Avoid => "avoid",
        }
    }
}

impl fmt::Display for MatchupTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A 1-100 matchup score for one (opponent, position) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupScore {
    pub score: u8,
    /// `None` when ranking data was missing
    pub tier: Option<MatchupTier>,
    pub rank: Option<u32>,
    pub opponent: Option<String>,
    pub description: String,
}

impl MatchupScore {
    pub fn unknown() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            tier: None,
            rank: None,
            opponent: None,
            description: "unknown matchup".to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.tier.is_some()
    }

    /// Start/sit advice. Single-starter positions are judged more
    /// conservatively than RB/WR.
    pub fn recommendation(&self, position: Position) -> &'static str {
        let score = self.score;
        match position {
            Position::Rb | Position::Wr => match score {
                80.. => "MUST START - elite matchup",
                65..=79 => "START - favorable matchup",
                50..=64 => "FLEX - solid play",
                35..=49 => "BENCH - only if desperate",
                _ => "SIT - avoid this matchup",
            },
            _ => match score {
                70.. => "START - great matchup",
                40..=69 => "START - decent matchup",
                25..=39 => "RISKY - monitor for better options",
                _ => "SIT - find an alternative",
            },
        }
    }
}

/// Map a defensive rank to a 1-100 score.
///
/// percentile = (32 - rank + 1) / 32 * 100, then a logistic curve centred
/// at 50 with a shallow slope; the result is truncated and clamped.
/// Rank 1 scores 92, rank 32 scores 8.
pub fn score_rank(rank: u32) -> u8 {
    let rank = rank.clamp(1, 32) as f64;
    let percentile = (32.0 - rank + 1.0) / 32.0 * 100.0;
    let curved = 100.0 / (1.0 + (-MATCHUP_STEEPNESS * (percentile - 50.0)).exp());
    (curved.trunc() as i64).clamp(1, 100) as u8
}

/// Strip home/away decoration from an opponent code: "@MIA", "vs. KC".
pub fn clean_opponent(opponent: &str) -> Option<String> {
    let trimmed = opponent.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let stripped = if lowered.starts_with("vs.") {
        &trimmed[3..]
    } else if lowered.starts_with("vs ") {
        &trimmed[2..]
    } else {
        trimmed
    };
    let team = canonical_team(stripped);
    (!team.is_empty()).then_some(team)
}

/// Score `position`'s matchup against `opponent`. Missing table entries,
/// missing ranks and blank opponents all give the neutral default.
pub fn score_matchup(table: &DefenseTable, opponent: &str, position: Position) -> MatchupScore {
    let Some(team) = clean_opponent(opponent) else {
        return MatchupScore::unknown();
    };
    let Some(rank) = table.rank_for(&team, position) else {
        return MatchupScore {
            opponent: Some(team),
            ..MatchupScore::unknown()
        };
    };

    let score = score_rank(rank);
    let tier = MatchupTier::from_score(score);
    MatchupScore {
        score,
        tier: Some(tier),
        rank: Some(rank),
        description: format!("{} vs {} (#{}/32)", tier, team, rank),
        opponent: Some(team),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::DefenseRanks;
    use std::collections::HashMap;

    fn table() -> DefenseTable {
        let mut teams = HashMap::new();
        teams.insert(
            "MIA".to_string(),
            DefenseRanks { vs_qb: Some(16), vs_rb: Some(3), vs_wr: Some(1), vs_te: None },
        );
        teams.insert(
            "SF".to_string(),
            DefenseRanks { vs_qb: Some(30), vs_rb: Some(32), vs_wr: Some(32), vs_te: Some(28) },
        );
        DefenseTable::new(teams)
    }

    #[test]
    fn test_score_rank_extremes() {
        assert_eq!(score_rank(1), 92);
        assert_eq!(score_rank(32), 8);
        assert!(score_rank(1) >= 90);
        assert!(score_rank(32) <= 10);
    }

    #[test]
    fn test_score_rank_bounded_and_ordered() {
        let mut previous = u8::MAX;
        for rank in 1..=32 {
            let score = score_rank(rank);
            assert!((1..=100).contains(&score));
            assert!(score <= previous);
            previous = score;
        }
        // Out-of-range ranks clamp rather than extrapolate
        assert_eq!(score_rank(0), score_rank(1));
        assert_eq!(score_rank(99), score_rank(32));
    }

    #[test]
    fn test_tiers_from_score() {
        assert_eq!(MatchupTier::from_score(95), MatchupTier::SmashSpot);
        assert_eq!(MatchupTier::from_score(90), MatchupTier::SmashSpot);
        assert_eq!(MatchupTier::from_score(50), MatchupTier::Neutral);
        assert_eq!(MatchupTier::from_score(19), MatchupTier::Terrible);
        assert_eq!(MatchupTier::from_score(8), MatchupTier::Avoid);
    }

    #[test]
    fn test_score_matchup_uses_position_group() {
        let table = table();
        let wr = score_matchup(&table, "@MIA", Position::Wr);
        assert_eq!(wr.rank, Some(1));
        assert_eq!(wr.tier, Some(MatchupTier::SmashSpot));
        assert!(wr.description.starts_with("smash spot vs MIA"));

        let wr = score_matchup(&table, "SF", Position::Wr);
        assert_eq!(wr.tier, Some(MatchupTier::Avoid));

        let k = score_matchup(&table, "vs. SF", Position::K);
        assert_eq!(k.rank, Some(30));
    }

    #[test]
    fn test_missing_data_is_neutral() {
        let table = table();
        let te = score_matchup(&table, "MIA", Position::Te);
        assert_eq!(te.score, 50);
        assert_eq!(te.description, "unknown matchup");
        assert!(!te.is_known());

        assert_eq!(score_matchup(&table, "BYE", Position::Qb).score, 50);
        assert_eq!(score_matchup(&table, "", Position::Qb).score, 50);
        assert_eq!(score_matchup(&DefenseTable::default(), "MIA", Position::Wr).score, 50);
    }

    #[test]
    fn test_clean_opponent() {
        assert_eq!(clean_opponent("@jac").as_deref(), Some("JAX"));
        assert_eq!(clean_opponent("vs KC").as_deref(), Some("KC"));
        assert_eq!(clean_opponent("  ").as_deref(), None);
    }

    #[test]
    fn test_recommendation_by_position_group() {
        let mut score = MatchupScore::unknown();
        score.score = 66;
        assert_eq!(score.recommendation(Position::Wr), "START - favorable matchup");
        assert_eq!(score.recommendation(Position::Te), "START - decent matchup");
    }
}
