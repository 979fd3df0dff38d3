pub mod decode;
pub mod sleeper;
pub mod snapshot;
pub mod types;

pub use sleeper::SleeperProvider;
pub use snapshot::SnapshotProvider;
pub use types::{
    canonical_team, DefenseRanks, DefenseTable, PlayerRecord, PoolPlayer, PoolSnapshot, Position,
    ProjectionLine, ProjectionRequest, ScoringFormat, TrendingFeed,
};

use std::time::Duration;
use thiserror::Error;

/// Failure reaching or reading a data provider.
///
/// None of these are fatal to a lineup request: callers fall back to
/// single-source or neutral data and mark the affected players degraded.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} data is unavailable")]
    Unavailable(&'static str),

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the fusion engine consumes from upstream.
///
/// Implementations own transport, auth, caching and retry. Each method may
/// fail independently; the enrichment pipeline degrades per category.
#[allow(async_fn_in_trait)]
pub trait DataProvider {
    /// Roster snapshot for the user's team (provider A).
    async fn roster(&self) -> Result<Vec<PlayerRecord>, ProviderError>;

    /// Bulk player pool keyed by stable provider B id.
    async fn player_pool(&self) -> Result<PoolSnapshot, ProviderError>;

    /// Provider B projection for one id. `Ok(None)` means the provider
    /// answered but has no projection for this player.
    async fn projection(
        &self,
        player_id: &str,
        request: ProjectionRequest,
    ) -> Result<Option<f64>, ProviderError>;

    /// Per-team, per-position-group defensive ranks.
    async fn defense_table(&self) -> Result<DefenseTable, ProviderError>;

    /// Ids currently being widely added or dropped.
    async fn trending(&self, lookback: Duration) -> Result<TrendingFeed, ProviderError>;
}
