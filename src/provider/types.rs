use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::decode;

/// Player position or roster marker.
///
/// `Bench` and `Inactive` only ever come from roster feeds where the slot
/// marker was reported in place of a real position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    K,
    Def,
    Flex,
    Bench,
    Inactive,
    Unknown,
}

/// Roster slot markers that can never start.
pub const INACTIVE_MARKERS: &[&str] = &["IR", "IR+", "NA", "O", "OUT", "SUSP", "PUP"];

/// Roster slot markers meaning "on the bench".
pub const BENCH_MARKERS: &[&str] = &["BN", "BENCH"];

impl Position {
    pub const SKILL: [Position; 6] = [
        Position::Qb,
        Position::Rb,
        Position::Wr,
        Position::Te,
        Position::K,
        Position::Def,
    ];

    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "QB" => Position::Qb,
            "RB" => Position::Rb,
            "WR" => Position::Wr,
            "TE" => Position::Te,
            "K" | "PK" => Position::K,
            "DEF" | "DST" | "D/ST" | "D" => Position::Def,
            "FLEX" | "W/R/T" | "W/R" | "R/W/T" => Position::Flex,
            "" => Position::Unknown,
            other if BENCH_MARKERS.contains(&other) => Position::Bench,
            other if INACTIVE_MARKERS.contains(&other) => Position::Inactive,
            _ => Position::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::K => "K",
            Position::Def => "DEF",
            Position::Flex => "FLEX",
            Position::Bench => "BN",
            Position::Inactive => "IR",
            Position::Unknown => "UNKNOWN",
        }
    }

    /// True for positions a player can actually be rostered at.
    pub fn is_playable(&self) -> bool {
        Position::SKILL.contains(self)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Position::Bench | Position::Inactive | Position::Flex)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode::lenient_position(deserializer)
    }
}

/// Canonical NFL team abbreviation. Providers disagree on a handful of
/// codes; everything is compared in this form.
pub fn canonical_team(team: &str) -> String {
    let upper = team.trim().trim_start_matches('@').trim().to_ascii_uppercase();
    match upper.as_str() {
        "JAC" => "JAX".to_string(),
        "WSH" => "WAS".to_string(),
        "LA" => "LAR".to_string(),
        "OAK" => "LV".to_string(),
        "SD" => "LAC".to_string(),
        "STL" => "LAR".to_string(),
        "GNB" => "GB".to_string(),
        "KAN" => "KC".to_string(),
        "NOR" => "NO".to_string(),
        "SFO" => "SF".to_string(),
        "TAM" => "TB".to_string(),
        "NWE" => "NE".to_string(),
        _ => upper,
    }
}

/// Raw player data from the roster provider (provider A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(alias = "name", deserialize_with = "decode::lenient_string")]
    pub display_name: String,

    #[serde(default = "unknown_position")]
    pub position: Position,

    /// Slot the player currently occupies on the roster ("BN", "IR", "RB", ...)
    #[serde(default, alias = "selected_position", deserialize_with = "decode::lenient_opt_string")]
    pub roster_slot: Option<String>,

    #[serde(default, deserialize_with = "decode::lenient_string")]
    pub team: String,

    #[serde(default, deserialize_with = "decode::lenient_string")]
    pub opponent: String,

    /// Provider A point projection
    #[serde(default, alias = "projected_points", deserialize_with = "decode::lenient_projection")]
    pub projection: Option<f64>,

    #[serde(default, alias = "status", deserialize_with = "decode::lenient_opt_string")]
    pub injury_status: Option<String>,

    #[serde(default, alias = "percent_owned", deserialize_with = "decode::lenient_f64")]
    pub ownership_pct: f64,

    /// Recent weekly fantasy scores, newest first
    #[serde(default, deserialize_with = "decode::lenient_scores")]
    pub recent_scores: Vec<f64>,
}

fn unknown_position() -> Position {
    Position::Unknown
}

impl PlayerRecord {
    pub fn new(display_name: &str, position: Position, team: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            position,
            roster_slot: None,
            team: team.to_string(),
            opponent: String::new(),
            projection: None,
            injury_status: None,
            ownership_pct: 0.0,
            recent_scores: Vec::new(),
        }
    }

    /// A record needs a name to be worth enriching. A missing team only
    /// drops the team hint.
    pub fn is_valid(&self) -> bool {
        !self.display_name.trim().is_empty()
    }

    /// True when the roster slot marks the player as unable to play.
    pub fn is_inactive_slot(&self) -> bool {
        self.roster_slot
            .as_deref()
            .map(|slot| INACTIVE_MARKERS.contains(&slot.trim().to_ascii_uppercase().as_str()))
            .unwrap_or(false)
    }
}

/// One player in the provider B pool snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolPlayer {
    #[serde(default, deserialize_with = "decode::lenient_string")]
    pub first_name: String,

    #[serde(default, deserialize_with = "decode::lenient_string")]
    pub last_name: String,

    #[serde(default = "unknown_position")]
    pub position: Position,

    #[serde(default, deserialize_with = "decode::lenient_opt_string")]
    pub team: Option<String>,

    #[serde(default, deserialize_with = "decode::lenient_bool")]
    pub active: bool,

    #[serde(default, deserialize_with = "decode::lenient_opt_string")]
    pub injury_status: Option<String>,
}

impl PoolPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A provider B player-pool snapshot, keyed by the provider's stable id.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub version: u64,
    pub fetched_at: DateTime<Utc>,
    pub players: HashMap<String, PoolPlayer>,
}

impl PoolSnapshot {
    pub fn new(players: HashMap<String, PoolPlayer>) -> Self {
        let fetched_at = Utc::now();
        Self {
            version: fetched_at.timestamp_millis().max(0) as u64,
            fetched_at,
            players,
        }
    }

    pub fn empty() -> Self {
        Self {
            version: 0,
            fetched_at: Utc::now(),
            players: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    #[default]
    Ppr,
    HalfPpr,
    Standard,
}

impl ScoringFormat {
    pub fn stat_key(&self) -> &'static str {
        match self {
            ScoringFormat::Ppr => "pts_ppr",
            ScoringFormat::HalfPpr => "pts_half_ppr",
            ScoringFormat::Standard => "pts_std",
        }
    }
}

/// Which week's projections to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionRequest {
    pub season: u16,
    pub week: u8,
    pub format: ScoringFormat,
}

/// Per-player weekly projection line split by scoring format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionLine {
    #[serde(default, deserialize_with = "decode::lenient_projection")]
    pub pts_ppr: Option<f64>,
    #[serde(default, deserialize_with = "decode::lenient_projection")]
    pub pts_half_ppr: Option<f64>,
    #[serde(default, deserialize_with = "decode::lenient_projection")]
    pub pts_std: Option<f64>,
    #[serde(default, deserialize_with = "decode::lenient_projection")]
    pub pts: Option<f64>,
}

impl ProjectionLine {
    /// Points for the requested format, falling back to whatever split exists.
    pub fn points(&self, format: ScoringFormat) -> Option<f64> {
        let preferred = match format {
            ScoringFormat::Ppr => self.pts_ppr,
            ScoringFormat::HalfPpr => self.pts_half_ppr,
            ScoringFormat::Standard => self.pts_std,
        };
        preferred
            .or(self.pts_ppr)
            .or(self.pts_half_ppr)
            .or(self.pts_std)
            .or(self.pts)
    }
}

/// Defensive rank (1-32) per position group for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseRanks {
    #[serde(default, deserialize_with = "decode::lenient_rank")]
    pub vs_qb: Option<u32>,
    #[serde(default, deserialize_with = "decode::lenient_rank")]
    pub vs_rb: Option<u32>,
    #[serde(default, deserialize_with = "decode::lenient_rank")]
    pub vs_wr: Option<u32>,
    #[serde(default, deserialize_with = "decode::lenient_rank")]
    pub vs_te: Option<u32>,
}

/// Defensive-strength table keyed by canonical team abbreviation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefenseTable {
    teams: HashMap<String, DefenseRanks>,
}

impl DefenseTable {
    pub fn new(teams: HashMap<String, DefenseRanks>) -> Self {
        Self {
            teams: teams
                .into_iter()
                .map(|(team, ranks)| (canonical_team(&team), ranks))
                .collect(),
        }
    }

    pub fn get(&self, team: &str) -> Option<&DefenseRanks> {
        self.teams.get(&canonical_team(team))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Rank of `team`'s defense against `position`. Kickers and defenses key
    /// off the opposing quarterback group.
    pub fn rank_for(&self, team: &str, position: Position) -> Option<u32> {
        let ranks = self.get(team)?;
        match position {
            Position::Rb => ranks.vs_rb,
            Position::Wr => ranks.vs_wr,
            Position::Te => ranks.vs_te,
            Position::Qb | Position::K | Position::Def => ranks.vs_qb,
            _ => None,
        }
    }
}

/// Trending-activity feed: provider B ids currently being added or dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendingFeed {
    pub adds: HashMap<String, u64>,
    pub drops: HashMap<String, u64>,
}

impl TrendingFeed {
    pub fn adds_for(&self, player_id: &str) -> u64 {
        self.adds.get(player_id).copied().unwrap_or(0)
    }

    pub fn drops_for(&self, player_id: &str) -> u64 {
        self.drops.get(player_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.drops.is_empty()
    }
}

/// One row of a trending response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingEntry {
    #[serde(deserialize_with = "decode::lenient_string")]
    pub player_id: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(decode::coerce_i64(&value, 0).max(0) as u64)
}
