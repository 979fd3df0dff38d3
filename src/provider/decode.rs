//! Boundary decoding for loosely typed provider payloads.
//!
//! Upstream providers return numbers as strings, nulls where a field is
//! unknown, and occasionally objects where a scalar is expected. Everything
//! is coerced here, once, so the rest of the crate only sees typed values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use std::collections::HashMap;

use super::types::{
    DefenseRanks, DefenseTable, PlayerRecord, PoolPlayer, Position, ProjectionLine, TrendingEntry,
};

/// Coerce any JSON value to a finite float, falling back to 0.0.
pub fn coerce_f64(value: &Value) -> f64 {
    coerce_opt_f64(value).unwrap_or(0.0)
}

/// Coerce a JSON value to a finite float, or None when it is not numeric.
pub fn coerce_opt_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerce a JSON value to an integer (floats truncate), or `default`.
pub fn coerce_i64(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
            .unwrap_or(default),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
                .unwrap_or(default)
        }
        _ => default,
    }
}

/// Coerce a JSON value to a trimmed string. Numbers are rendered, anything
/// else becomes empty.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_opt_string(value: &Value) -> Option<String> {
    Some(coerce_string(value)).filter(|s| !s.is_empty())
}

pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

/// Positive projections only: zero, negative or non-numeric means "absent".
pub fn lenient_projection<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_opt_f64(&value).filter(|v| *v > 0.0))
}

pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(&value))
}

pub fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_opt_string(&value))
}

pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

pub fn lenient_scores<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(coerce_opt_f64).collect(),
        _ => Vec::new(),
    })
}

/// Defensive ranks outside 1..=32 are treated as missing.
pub fn lenient_rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let rank = coerce_i64(&value, 0);
    Ok((1..=32).contains(&rank).then_some(rank as u32))
}

/// Positions may arrive as a bare string, an object with a `position` key,
/// or the nested `{"0": {"position": ..}}` shape some roster feeds use.
pub fn position_from_value(value: &Value) -> Position {
    match value {
        Value::String(s) => Position::parse(s),
        Value::Object(map) => {
            if let Some(inner) = map.get("position") {
                return position_from_value(inner);
            }
            map.values()
                .next()
                .map(position_from_value)
                .unwrap_or(Position::Unknown)
        }
        Value::Array(items) => items
            .first()
            .map(position_from_value)
            .unwrap_or(Position::Unknown),
        _ => Position::Unknown,
    }
}

pub fn lenient_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Position, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(position_from_value(&value))
}

/// Decode a roster payload: either `{"roster": [...]}` or a bare array.
/// Entries that are not objects, fail to decode, or lack a name are
/// skipped. Team-less entries are kept with an empty team.
pub fn decode_roster(payload: &Value) -> Vec<PlayerRecord> {
    let entries: &[Value] = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("roster") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| serde_json::from_value::<PlayerRecord>(entry.clone()).ok())
        .filter(PlayerRecord::is_valid)
        .collect()
}

/// Decode a bulk player pool keyed by provider id.
pub fn decode_pool(payload: &Value) -> HashMap<String, PoolPlayer> {
    let Value::Object(map) = payload else {
        return HashMap::new();
    };
    map.iter()
        .filter_map(|(id, entry)| {
            serde_json::from_value::<PoolPlayer>(entry.clone())
                .ok()
                .map(|player| (id.clone(), player))
        })
        .collect()
}

/// Decode weekly projections. Accepts the map shape `{id: {pts_ppr: ..}}`
/// and the list shape `[{player_id: .., stats: {pts_ppr: ..}}]`.
pub fn decode_projections(payload: &Value) -> HashMap<String, ProjectionLine> {
    match payload {
        Value::Object(map) => map
            .iter()
            .filter_map(|(id, entry)| {
                serde_json::from_value::<ProjectionLine>(entry.clone())
                    .ok()
                    .map(|line| (id.clone(), line))
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let id = coerce_string(item.get("player_id")?);
                if id.is_empty() {
                    return None;
                }
                let stats = item.get("stats").unwrap_or(item);
                serde_json::from_value::<ProjectionLine>(stats.clone())
                    .ok()
                    .map(|line| (id, line))
            })
            .collect(),
        _ => HashMap::new(),
    }
}

/// Decode a defensive-strength table keyed by team.
pub fn decode_defense(payload: &Value) -> DefenseTable {
    let Value::Object(map) = payload else {
        return DefenseTable::default();
    };
    let teams = map
        .iter()
        .filter_map(|(team, entry)| {
            serde_json::from_value::<DefenseRanks>(entry.clone())
                .ok()
                .map(|ranks| (team.clone(), ranks))
        })
        .collect();
    DefenseTable::new(teams)
}

/// Decode a trending list into an id -> count map.
pub fn decode_trending(payload: &Value) -> HashMap<String, u64> {
    let Value::Array(items) = payload else {
        return HashMap::new();
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<TrendingEntry>(item.clone()).ok())
        .filter(|entry| !entry.player_id.is_empty())
        .map(|entry| (entry.player_id, entry.count))
        .collect()
}
