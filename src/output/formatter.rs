use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::enrich::{DataQuality, EnrichedPlayer};
use crate::identity::CanonicalIdentity;
use crate::lineup::LineupAssignment;
use crate::provider::types::Position;
use crate::scoring::{MatchupScore, RiskLabel, ScoreResult, Tier};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format fantasy points with one decimal.
/// If incomplete is true, appends asterisk to indicate partial data
pub fn format_points(points: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.1}*", points)
    } else {
        format!("{:.1}", points)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad by character count; `format!` width counts chars too, but colored
/// strings carry escape codes, so pad before coloring.
fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

fn color_tier(text: &str, tier: Tier, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match tier {
        Tier::Elite | Tier::Stud => text.green().bold().to_string(),
        Tier::Solid => text.green().to_string(),
        Tier::Flex => text.yellow().to_string(),
        Tier::Bench => text.dimmed().to_string(),
        Tier::Unknown => text.red().to_string(),
    }
}

fn color_risk(risk: RiskLabel, use_colors: bool) -> String {
    let text = risk.as_str();
    if !use_colors {
        return text.to_string();
    }
    match risk {
        RiskLabel::Low => text.dimmed().to_string(),
        RiskLabel::Moderate => text.yellow().to_string(),
        RiskLabel::High | RiskLabel::Out => text.red().bold().to_string(),
    }
}

fn color_matchup(matchup: &MatchupScore, use_colors: bool) -> String {
    let text = format!("{:>3}", matchup.score);
    if !use_colors || !matchup.is_known() {
        return text;
    }
    match matchup.score {
        65.. => text.green().to_string(),
        35..=64 => text,
        _ => text.red().to_string(),
    }
}

const NAME_WIDTH: usize = 24;

/// One row: slot label, name, position/team, composite, range, decision, tier, matchup, risk.
fn format_player_row(label: &str, player: &EnrichedPlayer, name_width: usize, use_colors: bool) -> String {
    let name = pad(&truncate_name(player.name(), name_width), name_width);
    let pos_team = pad(&format!("{} {}", player.position(), player.record.team), 8);
    let composite = format!("{:>6}", format_points(player.composite(), player.is_degraded()));
    let range = format!("{:>11}", format!("{:.1}-{:.1}", player.fused.floor, player.fused.ceiling));
    let decision = format!("{:>5.1}", player.decision_score());
    let tier = color_tier(&pad(player.tier.as_str(), 7), player.tier, use_colors);
    let matchup = color_matchup(&player.matchup, use_colors);
    let risk = color_risk(player.risk, use_colors);

    if use_colors {
        format!(
            "{} {} {} {} {} {} {} {} {}",
            pad(label, 5).dimmed(),
            name.bold(),
            pos_team.cyan(),
            composite,
            range.dimmed(),
            decision,
            tier,
            matchup,
            risk
        )
    } else {
        format!(
            "{} {} {} {} {} {} {} {} {}",
            pad(label, 5),
            name,
            pos_team,
            composite,
            range,
            decision,
            tier,
            matchup,
            risk
        )
    }
}

fn name_width() -> usize {
    // Row without the name column is ~70 chars
    match get_terminal_width() {
        Some(width) if width > 70 + 12 => (width - 70).min(NAME_WIDTH),
        Some(_) => 12,
        None => NAME_WIDTH,
    }
}

fn header(use_colors: bool) -> String {
    let text = format!(
        "{} {} {} {:>6} {:>11} {:>5} {} {:>3} {}",
        pad("SLOT", 5),
        pad("PLAYER", name_width()),
        pad("POS", 8),
        "PROJ",
        "RANGE",
        "SCORE",
        pad("TIER", 7),
        "MU",
        "RISK"
    );
    if use_colors {
        text.dimmed().to_string()
    } else {
        text
    }
}

/// Format a lineup: starters in slot order, bench, unfilled slots and notes.
pub fn format_lineup(lineup: &LineupAssignment<'_>, use_colors: bool) -> String {
    let width = name_width();
    let mut lines = vec![header(use_colors)];

    for filled in &lineup.starters {
        lines.push(format_player_row(&filled.slot.name, filled.player, width, use_colors));
    }
    for slot in &lineup.unfilled {
        let row = format!("{} {}", pad(slot, 5), "(empty)");
        lines.push(if use_colors { row.red().to_string() } else { row });
    }

    let total = format!("Projected total: {:.1}", lineup.projected_total());
    lines.push(if use_colors { total.bold().to_string() } else { total });

    if !lineup.bench.is_empty() {
        lines.push(String::new());
        for player in &lineup.bench {
            lines.push(format_player_row("BN", player, width, use_colors));
        }
    }

    if !lineup.notes.is_empty() {
        lines.push(String::new());
        for note in &lineup.notes {
            let note = format!("! {}", note);
            lines.push(if use_colors { note.yellow().to_string() } else { note });
        }
    }

    lines.join("\n")
}

/// Format players grouped by position, best decision score first.
pub fn format_player_groups(
    groups: &BTreeMap<Position, Vec<&EnrichedPlayer>>,
    use_colors: bool,
) -> String {
    if groups.is_empty() {
        return "No players found.".to_string();
    }

    let width = name_width();
    let mut lines = vec![header(use_colors)];
    for players in groups.values() {
        for (idx, player) in players.iter().enumerate() {
            let label = format!("{:>2}.", idx + 1);
            lines.push(format_player_row(&label, player, width, use_colors));
        }
    }
    lines.join("\n")
}

/// Format players as tab-separated values for scripting
/// Columns: name, position, team, composite, floor, ceiling, decision, tier, confidence (no headers, no colors)
pub fn format_tsv(players: &[&EnrichedPlayer]) -> String {
    players
        .iter()
        .map(|p| {
            format!(
                "{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.1}\t{}\t{:.2}",
                p.name(),
                p.position(),
                p.record.team,
                p.composite(),
                p.fused.floor,
                p.fused.ceiling,
                p.decision_score(),
                p.tier,
                p.confidence
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a resolver result for one query.
pub fn format_identity(query: &str, identity: &CanonicalIdentity, use_colors: bool) -> String {
    let mut lines = Vec::new();
    match (&identity.provider_key, &identity.matched_name) {
        (Some(key), Some(name)) => {
            let headline = format!("{} -> {} ({})", query, name, key);
            lines.push(if use_colors { headline.bold().to_string() } else { headline });
        }
        _ => {
            let headline = format!("{} -> no match", query);
            lines.push(if use_colors { headline.red().to_string() } else { headline });
        }
    }
    lines.push(format!("  Normalized: {}", identity.normalized_name));
    lines.push(format!("  Method: {}", identity.method));
    lines.push(format!("  Confidence: {:.2}", identity.confidence()));
    if identity.position_mismatch {
        lines.push("  Warning: position hint disagrees".to_string());
    }
    if identity.team_mismatch {
        lines.push("  Warning: team hint disagrees".to_string());
    }
    lines.push(format!("  Pool version: {}", identity.index_version));
    lines.join("\n")
}

/// Format a single matchup lookup.
pub fn format_matchup(matchup: &MatchupScore, position: Position, use_colors: bool) -> String {
    let score = color_matchup(matchup, use_colors);
    format!(
        "{}  {}\n  {}",
        score.trim_start(),
        matchup.description,
        matchup.recommendation(position)
    )
}

/// Format the data-quality summary shown under a lineup.
pub fn format_quality(quality: &DataQuality, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "Matched {}/{} players ({:.0}%), avg confidence {:.2}, projections {}/{} ({} from both)",
        quality.matched_players,
        quality.total_players,
        quality.success_rate * 100.0,
        quality.average_confidence,
        quality.with_projection,
        quality.total_players,
        quality.with_both_projections
    )];

    let methods = quality
        .method_counts
        .iter()
        .map(|(method, count)| format!("{} {}", method, count))
        .collect::<Vec<_>>()
        .join(", ");
    if !methods.is_empty() {
        lines.push(format!("Methods: {}", methods));
    }

    if quality.position_mismatches + quality.team_mismatches > 0 {
        lines.push(format!(
            "Hint mismatches: {} position, {} team",
            quality.position_mismatches, quality.team_mismatches
        ));
    }
    if quality.degraded_players > 0 {
        lines.push(format!("{} players scored with partial data (*)", quality.degraded_players));
    }
    if !quality.unavailable_sources.is_empty() {
        let warning = format!("Unavailable: {}", quality.unavailable_sources.join(", "));
        lines.push(if use_colors { warning.yellow().to_string() } else { warning });
    }

    let text = lines.join("\n");
    if use_colors {
        text.dimmed().to_string()
    } else {
        text
    }
}

/// Per-factor decision score breakdown, one line per factor.
pub fn format_breakdown(result: &ScoreResult) -> String {
    let mut lines: Vec<String> = result
        .breakdown
        .factors
        .iter()
        .map(|f| {
            format!(
                "  {:<10} {:>5.1} -> {:>5.1}  {}",
                f.label, f.before, f.after, f.description
            )
        })
        .collect();
    lines.push(format!("  {:<10} {}", "Score", format_points(result.score, result.incomplete)));
    lines.join("\n")
}

/// Pretty JSON for `--format json`.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::player::fixtures::player;
    use crate::identity::MatchMethod;
    use crate::lineup::{assign, SlotRequirement};
    use crate::scoring::score_matchup;
    use crate::provider::types::DefenseTable;

    // format_points tests
    #[test]
    fn test_format_points() {
        assert_eq!(format_points(21.0, false), "21.0");
        assert_eq!(format_points(7.25, false), "7.2");
        assert_eq!(format_points(14.06, true), "14.1*");
    }

    // truncate_name tests
    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("Josh Allen", 20), "Josh Allen");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("Amon-Ra St. Brown", 10), "Amon-Ra...");
    }

    #[test]
    fn test_truncate_name_unicode() {
        assert_eq!(truncate_name("Jérôme Ba", 9), "Jérôme Ba");
        assert_eq!(truncate_name("Jérôme Bettis", 9), "Jérôme...");
    }

    #[test]
    fn test_truncate_name_very_narrow() {
        assert_eq!(truncate_name("Travis Kelce", 3), "Tra");
    }

    #[test]
    fn test_format_lineup_plain() {
        let players = vec![
            player("Josh Allen", Position::Qb, 24.0),
            player("Bijan Robinson", Position::Rb, 18.5),
            player("Backup Qb", Position::Qb, 12.0),
        ];
        let lineup = assign(&players, &SlotRequirement::default());
        let result = format_lineup(&lineup, false);

        let lines: Vec<&str> = result.lines().collect();
        assert!(lines[0].starts_with("SLOT"));
        assert!(lines[1].starts_with("QB"));
        assert!(lines[1].contains("Josh Allen"));
        assert!(lines[1].contains("24.0"));
        assert!(result.contains("RB2   (empty)"));
        assert!(result.contains("Projected total: 42.5"));
        assert!(result.contains("BN    Backup Qb"));
        assert!(result.contains("! No eligible player for DEF"));
    }

    #[test]
    fn test_degraded_player_marked() {
        let mut p = player("Rookie", Position::Wr, 9.0);
        p.degraded.push(crate::enrich::DegradedReason::Unmatched);
        let row = format_player_row("WR1", &p, NAME_WIDTH, false);
        assert!(row.contains("9.0*"));
    }

    #[test]
    fn test_format_player_groups_empty() {
        let groups = BTreeMap::new();
        assert_eq!(format_player_groups(&groups, false), "No players found.");
    }

    #[test]
    fn test_format_tsv() {
        let p = player("Josh Allen", Position::Qb, 24.0);
        let result = format_tsv(&[&p]);
        let columns: Vec<&str> = result.split('\t').collect();
        assert_eq!(columns.len(), 9);
        assert_eq!(columns[0], "Josh Allen");
        assert_eq!(columns[1], "QB");
        assert_eq!(columns[3], "24.00");
        assert_eq!(columns[8], "1.00");
    }

    #[test]
    fn test_format_identity() {
        let matched = CanonicalIdentity {
            provider_key: Some("4984".to_string()),
            normalized_name: "josh allen".to_string(),
            method: MatchMethod::Exact,
            matched_name: Some("Josh Allen".to_string()),
            position_mismatch: false,
            team_mismatch: true,
            index_version: 3,
        };
        let result = format_identity("Josh Allen", &matched, false);
        assert!(result.starts_with("Josh Allen -> Josh Allen (4984)"));
        assert!(result.contains("Method: exact"));
        assert!(result.contains("Confidence: 0.50"));
        assert!(result.contains("team hint disagrees"));

        let unmatched = CanonicalIdentity::unmatched("nobody here".to_string(), 3);
        let result = format_identity("Nobody Here", &unmatched, false);
        assert!(result.starts_with("Nobody Here -> no match"));
        assert!(result.contains("Confidence: 0.00"));
    }

    #[test]
    fn test_format_matchup_unknown() {
        let matchup = score_matchup(&DefenseTable::default(), "KC", Position::Rb);
        let result = format_matchup(&matchup, Position::Rb, false);
        assert!(result.starts_with("50"));
        assert!(result.contains("FLEX - solid play"));
    }

    #[test]
    fn test_format_quality() {
        let players = vec![player("A One", Position::Qb, 20.0), player("B Two", Position::Rb, 10.0)];
        let mut quality = DataQuality::from_players(&players, 2, &["trending"]);
        quality.team_mismatches = 1;
        let result = format_quality(&quality, false);
        assert!(result.contains("Matched 2/2 players (100%)"));
        assert!(result.contains("Methods: exact 2"));
        assert!(result.contains("Hint mismatches: 0 position, 1 team"));
        assert!(result.contains("Unavailable: trending"));
    }

    #[test]
    fn test_format_breakdown() {
        let p = player("Josh Allen", Position::Qb, 24.0);
        let result = format_breakdown(&p.decision);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), p.decision.breakdown.factors.len() + 1);
        assert!(lines[0].trim_start().starts_with("Projection"));
        assert!(lines.last().unwrap().contains(&format!("{:.1}", p.decision.score)));
    }

    #[test]
    fn test_format_json() {
        let p = player("Josh Allen", Position::Qb, 24.0);
        let json = format_json(&p).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["record"]["display_name"], "Josh Allen");
        assert_eq!(value["identity"]["method"], "exact");
        assert_eq!(value["tier"], "elite");
    }
}
