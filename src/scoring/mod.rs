pub mod config;
pub mod engine;
pub mod form;
pub mod fusion;
pub mod matchup;
pub mod normalizer;
pub mod tier;
pub mod validation;

pub use config::*;
pub use engine::{calculate_score, DecisionInputs, ScoreResult};
pub use fusion::{fuse, fuse_with, fusion_weights, FusedProjection};
pub use matchup::{score_matchup, score_rank, MatchupScore, MatchupTier};
pub use normalizer::{compare_for_flex, explain_comparison, normalize, FlexPick, PositionValue};
pub use tier::{health_factor, risk_label, RiskLabel, Tier, TierTable};
pub use validation::{validate_fusion, validate_scoring};
