use serde::Serialize;
use std::collections::BTreeMap;

use crate::identity::MatchMethod;

use super::player::EnrichedPlayer;

/// Trustworthiness counters for one enriched pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_players: usize,
    pub matched_players: usize,
    pub method_counts: BTreeMap<MatchMethod, usize>,
    pub position_mismatches: usize,
    pub team_mismatches: usize,
    pub average_confidence: f64,
    /// Matched players as a fraction of all players
    pub success_rate: f64,
    pub with_projection: usize,
    pub projection_rate: f64,
    pub with_both_projections: usize,
    pub degraded_players: usize,
    pub pool_version: u64,
    /// Provider categories that failed outright for this request
    pub unavailable_sources: Vec<String>,
}

impl DataQuality {
    pub fn from_players(players: &[EnrichedPlayer], pool_version: u64, unavailable: &[&str]) -> Self {
        let total = players.len();
        let mut quality = DataQuality {
            total_players: total,
            pool_version,
            unavailable_sources: unavailable.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };

        let mut confidence_sum = 0.0;
        for player in players {
            *quality.method_counts.entry(player.identity.method).or_insert(0) += 1;
            if player.is_matched() {
                quality.matched_players += 1;
            }
            if player.identity.position_mismatch {
                quality.position_mismatches += 1;
            }
            if player.identity.team_mismatch {
                quality.team_mismatches += 1;
            }
            if player.has_projection() {
                quality.with_projection += 1;
            }
            if player.has_both_projections() {
                quality.with_both_projections += 1;
            }
            if player.is_degraded() {
                quality.degraded_players += 1;
            }
            confidence_sum += player.confidence;
        }

        if total > 0 {
            let n = total as f64;
            quality.average_confidence = confidence_sum / n;
            quality.success_rate = quality.matched_players as f64 / n;
            quality.projection_rate = quality.with_projection as f64 / n;
        }
        quality
    }

    pub fn method_count(&self, method: MatchMethod) -> usize {
        self.method_counts.get(&method).copied().unwrap_or(0)
    }
}
