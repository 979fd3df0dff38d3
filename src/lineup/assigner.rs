use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::enrich::{DataQuality, EnrichedPlayer, EnrichedPool};
use crate::scoring::RiskLabel;

use super::slots::{SlotInstance, SlotRequirement};

/// Starters at or below this matchup score get a warning note.
pub const POOR_MATCHUP_SCORE: u8 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct FilledSlot<'a> {
    pub slot: SlotInstance,
    pub player: &'a EnrichedPlayer,
}

/// Result of one greedy assignment pass.
///
/// Every player appears exactly once, either in `starters` or on `bench`.
#[derive(Debug, Clone, Serialize)]
pub struct LineupAssignment<'a> {
    /// In slot-table order
    pub starters: Vec<FilledSlot<'a>>,
    /// Slot names with no eligible candidate
    pub unfilled: Vec<String>,
    /// Best composite first
    pub bench: Vec<&'a EnrichedPlayer>,
    pub notes: Vec<String>,
    pub quality: DataQuality,
}

impl<'a> LineupAssignment<'a> {
    pub fn starter(&self, slot_name: &str) -> Option<&'a EnrichedPlayer> {
        self.starters
            .iter()
            .find(|f| f.slot.name == slot_name)
            .map(|f| f.player)
    }

    pub fn projected_total(&self) -> f64 {
        self.starters.iter().map(|f| f.player.composite()).sum()
    }
}

fn by_strength(a: &EnrichedPlayer, b: &EnrichedPlayer) -> Ordering {
    b.composite()
        .total_cmp(&a.composite())
        .then_with(|| b.decision_score().total_cmp(&a.decision_score()))
}

/// Why a player never competes for a slot.
fn bench_reason(player: &EnrichedPlayer) -> Option<String> {
    if player.record.is_inactive_slot() {
        return Some(format!(
            "{} is in an inactive roster slot ({})",
            player.name(),
            player.record.roster_slot.as_deref().unwrap_or("IR")
        ));
    }
    if player.risk == RiskLabel::Out {
        return Some(format!(
            "{} is out ({})",
            player.name(),
            player.injury_status.as_deref().unwrap_or("inactive")
        ));
    }
    if !player.position().is_playable() {
        return Some(format!("{} has no playable position", player.name()));
    }
    None
}

/// Assign the enriched pool to slots, carrying the pool's quality counters.
pub fn assign_pool<'a>(pool: &'a EnrichedPool, slots: &SlotRequirement) -> LineupAssignment<'a> {
    let mut lineup = assign(&pool.players, slots);
    lineup.quality = pool.quality.clone();
    lineup
}

/// Greedy, single-pass slot assignment.
///
/// Players are visited strongest composite first. Each goes to the first
/// empty eligible slot (fixed positions before FLEX); when all are taken it
/// challenges the weakest eligible incumbent and the loser is benched, ties
/// keeping the incumbent. A player bumped from a fixed slot is not offered
/// FLEX again.
pub fn assign<'a>(players: &'a [EnrichedPlayer], slots: &SlotRequirement) -> LineupAssignment<'a> {
    let instances = slots.instances();
    let mut occupants: Vec<Option<&'a EnrichedPlayer>> = vec![None; instances.len()];
    let mut bench: Vec<&'a EnrichedPlayer> = Vec::new();
    let mut notes = Vec::new();

    let mut order: Vec<&'a EnrichedPlayer> = players.iter().collect();
    order.sort_by(|a, b| by_strength(a, b));

    for player in order {
        if let Some(reason) = bench_reason(player) {
            debug!("bench {}: {}", player.name(), reason);
            notes.push(reason);
            bench.push(player);
            continue;
        }

        let mut candidates: Vec<usize> = (0..instances.len())
            .filter(|&i| slots.accepts(instances[i].kind, player.position()))
            .collect();
        candidates.sort_by_key(|&i| instances[i].is_flex());

        if candidates.is_empty() {
            bench.push(player);
            continue;
        }

        if let Some(&empty) = candidates.iter().find(|&&i| occupants[i].is_none()) {
            debug!("{} -> {}", player.name(), instances[empty].name);
            occupants[empty] = Some(player);
            continue;
        }

        // Every eligible slot is taken: challenge the weakest incumbent
        let weakest = candidates
            .iter()
            .copied()
            .filter_map(|i| occupants[i].map(|p| (i, p)))
            .min_by(|(_, a), (_, b)| a.composite().total_cmp(&b.composite()));

        match weakest {
            Some((slot, incumbent)) if player.composite() > incumbent.composite() => {
                debug!("{} replaces {} at {}", player.name(), incumbent.name(), instances[slot].name);
                occupants[slot] = Some(player);
                bench.push(incumbent);
            }
            _ => bench.push(player),
        }
    }

    bench.sort_by(|a, b| by_strength(a, b));

    let mut starters = Vec::new();
    let mut unfilled = Vec::new();
    for (slot, occupant) in instances.into_iter().zip(occupants) {
        match occupant {
            Some(player) => starters.push(FilledSlot { slot, player }),
            None => {
                notes.push(format!("No eligible player for {}", slot.name));
                unfilled.push(slot.name);
            }
        }
    }

    for player in &bench {
        if player.tier.is_must_start() && bench_reason(player).is_none() {
            notes.push(format!("{} ({}) is on the bench", player.name(), player.tier));
        }
    }
    for filled in &starters {
        let matchup = &filled.player.matchup;
        if matchup.is_known() && matchup.score <= POOR_MATCHUP_SCORE {
            notes.push(format!(
                "{} at {} faces a poor matchup: {}",
                filled.player.name(),
                filled.slot.name,
                matchup.description
            ));
        }
    }

    let quality = DataQuality::from_players(players, 0, &[]);
    LineupAssignment {
        starters,
        unfilled,
        bench,
        notes,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::player::fixtures::player;
    use crate::lineup::slots::{SlotKind, SlotSpec};
    use crate::provider::types::Position;
    use crate::scoring::matchup::score_rank;
    use crate::scoring::{MatchupScore, MatchupTier};
    use std::collections::HashSet;

    fn starting_core() -> Vec<EnrichedPlayer> {
        vec![
            player("Qb One", Position::Qb, 22.0),
            player("Rb One", Position::Rb, 18.0),
            player("Rb Two", Position::Rb, 14.0),
            player("Wr One", Position::Wr, 16.0),
            player("Wr Two", Position::Wr, 12.0),
            player("Te One", Position::Te, 9.0),
            player("Flex Rb", Position::Rb, 10.0),
            player("K One", Position::K, 8.0),
            player("Def One", Position::Def, 7.0),
        ]
    }

    fn assert_partitioned(players: &[EnrichedPlayer], lineup: &LineupAssignment<'_>) {
        let mut seen = HashSet::new();
        for filled in &lineup.starters {
            assert!(seen.insert(filled.player.name().to_string()), "{} assigned twice", filled.player.name());
        }
        for benched in &lineup.bench {
            assert!(seen.insert(benched.name().to_string()), "{} both started and benched", benched.name());
        }
        assert_eq!(seen.len(), players.len());
    }

    #[test]
    fn test_one_candidate_per_slot_plus_extras() {
        let mut players = starting_core();
        players.push(player("Qb Backup", Position::Qb, 12.0));
        players.push(player("K Backup", Position::K, 5.0));
        players.push(player("Def Backup", Position::Def, 4.0));

        let lineup = assign(&players, &SlotRequirement::default());
        assert_eq!(lineup.starters.len(), 9);
        assert!(lineup.unfilled.is_empty());
        assert_eq!(lineup.bench.len(), 3);
        assert_eq!(lineup.starter("FLEX").unwrap().name(), "Flex Rb");
        assert_eq!(lineup.starter("QB").unwrap().name(), "Qb One");
        assert_partitioned(&players, &lineup);
    }

    #[test]
    fn test_sixteen_player_roster_is_complete() {
        let mut players = starting_core();
        players.push(player("Qb Backup", Position::Qb, 12.0));
        players.push(player("Rb Three", Position::Rb, 6.0));
        players.push(player("Wr Three", Position::Wr, 9.5));
        players.push(player("Wr Four", Position::Wr, 5.0));
        players.push(player("Te Two", Position::Te, 4.0));
        players.push(player("K Backup", Position::K, 5.0));
        players.push(player("Def Backup", Position::Def, 4.0));
        assert_eq!(players.len(), 16);

        let lineup = assign(&players, &SlotRequirement::default());
        assert_eq!(lineup.starters.len(), 9);
        assert!(lineup.unfilled.is_empty());
        assert_eq!(lineup.bench.len(), 7);
        assert_partitioned(&players, &lineup);
        // Flex goes to the best remaining RB/WR/TE
        assert_eq!(lineup.starter("FLEX").unwrap().name(), "Flex Rb");
    }

    #[test]
    fn test_strongest_fill_fixed_slots_first() {
        let players = vec![
            player("Wr Low", Position::Wr, 7.0),
            player("Wr High", Position::Wr, 15.0),
            player("Wr Mid", Position::Wr, 11.0),
        ];
        let lineup = assign(&players, &SlotRequirement::default());
        assert_eq!(lineup.starter("WR1").unwrap().name(), "Wr High");
        assert_eq!(lineup.starter("WR2").unwrap().name(), "Wr Mid");
        assert_eq!(lineup.starter("FLEX").unwrap().name(), "Wr Low");
    }

    #[test]
    fn test_unfillable_slots_reported() {
        let players = vec![player("Qb One", Position::Qb, 20.0)];
        let lineup = assign(&players, &SlotRequirement::default());
        assert_eq!(lineup.starters.len(), 1);
        assert_eq!(lineup.unfilled.len(), 8);
        assert!(lineup.notes.iter().any(|n| n == "No eligible player for DEF"));
    }

    #[test]
    fn test_inactive_and_out_players_go_to_bench() {
        let mut on_ir = player("Hurt Rb", Position::Rb, 25.0);
        on_ir.record.roster_slot = Some("IR".to_string());
        let mut out = player("Out Wr", Position::Wr, 20.0);
        out.risk = RiskLabel::Out;
        out.injury_status = Some("O".to_string());
        let marker = player("Mystery", Position::Bench, 10.0);
        let healthy = player("Healthy Rb", Position::Rb, 8.0);
        let players = vec![on_ir, out, marker, healthy];

        let lineup = assign(&players, &SlotRequirement::default());
        assert_eq!(lineup.starter("RB1").unwrap().name(), "Healthy Rb");
        assert_eq!(lineup.bench.len(), 3);
        assert!(lineup.notes.iter().any(|n| n.contains("Hurt Rb is in an inactive roster slot")));
        assert!(lineup.notes.iter().any(|n| n.contains("Out Wr is out")));
        // Benched for status, not flagged as a wasted stud
        assert!(!lineup.notes.iter().any(|n| n.contains("is on the bench")));
        assert_partitioned(&players, &lineup);
    }

    #[test]
    fn test_tie_keeps_incumbent() {
        let slots = SlotRequirement {
            specs: vec![SlotSpec {
                kind: SlotKind::Fixed(Position::Qb),
                count: 1,
            }],
            flex_positions: vec![],
        };
        let players = vec![
            player("First Qb", Position::Qb, 18.0),
            player("Second Qb", Position::Qb, 18.0),
        ];
        let lineup = assign(&players, &slots);
        assert_eq!(lineup.starter("QB").unwrap().name(), "First Qb");
        assert_eq!(lineup.bench[0].name(), "Second Qb");
    }

    #[test]
    fn test_notes_for_benched_stud_and_poor_matchup() {
        let mut players = starting_core();
        // Elite QB left over after the QB slot is taken by a stronger one
        players.push(player("Elite Backup", Position::Qb, 21.0));
        players[0].matchup = MatchupScore {
            score: score_rank(32),
            tier: Some(MatchupTier::Avoid),
            rank: Some(32),
            opponent: Some("SF".to_string()),
            description: "avoid vs SF (#32/32)".to_string(),
        };

        let lineup = assign(&players, &SlotRequirement::default());
        assert!(lineup.notes.iter().any(|n| n.starts_with("Elite Backup (stud) is on the bench")));
        assert!(lineup.notes.iter().any(|n| n.contains("Qb One at QB faces a poor matchup")));
    }

    #[test]
    fn test_projected_total_and_quality() {
        let players = starting_core();
        let lineup = assign(&players, &SlotRequirement::default());
        let expected: f64 = players.iter().map(|p| p.composite()).sum();
        assert!((lineup.projected_total() - expected).abs() < 1e-9);
        assert_eq!(lineup.quality.total_players, 9);
        assert_eq!(lineup.quality.matched_players, 9);
    }
}
