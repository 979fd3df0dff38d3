pub mod formatter;

pub use formatter::{
    format_breakdown, format_identity, format_json, format_lineup, format_matchup, format_player_groups,
    format_points, format_quality, format_tsv, should_use_colors,
};
