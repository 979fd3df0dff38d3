use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use super::decode;
use super::types::{
    DefenseTable, PlayerRecord, PoolSnapshot, ProjectionLine, ProjectionRequest, TrendingFeed,
};
use super::{DataProvider, ProviderError};

pub const ROSTER_FILE: &str = "roster.json";
pub const PLAYERS_FILE: &str = "players.json";
pub const PROJECTIONS_FILE: &str = "projections.json";
pub const DEFENSE_FILE: &str = "defense.json";
pub const TRENDING_FILE: &str = "trending.json";

/// Provider backed by a directory of JSON payloads captured from upstream.
///
/// A missing file means that category is unavailable, exactly like an
/// upstream outage would.
pub struct SnapshotProvider {
    dir: PathBuf,
    projections: OnceCell<HashMap<String, ProjectionLine>>,
}

impl SnapshotProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            projections: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_json(&self, file: &str, category: &'static str) -> Result<Value, ProviderError> {
        let path = self.dir.join(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found at {}", category, path.display());
                return Err(ProviderError::Unavailable(category));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Week-specific file (`projections_2025_7.json`) wins over the generic one.
    async fn load_projections(
        &self,
        request: ProjectionRequest,
    ) -> Result<HashMap<String, ProjectionLine>, ProviderError> {
        let weekly = format!("projections_{}_{}.json", request.season, request.week);
        let payload = match self.read_json(&weekly, "projections").await {
            Ok(payload) => payload,
            Err(ProviderError::Unavailable(_)) => {
                self.read_json(PROJECTIONS_FILE, "projections").await?
            }
            Err(e) => return Err(e),
        };
        Ok(decode::decode_projections(&payload))
    }
}

impl DataProvider for SnapshotProvider {
    async fn roster(&self) -> Result<Vec<PlayerRecord>, ProviderError> {
        let payload = self.read_json(ROSTER_FILE, "roster").await?;
        Ok(decode::decode_roster(&payload))
    }

    async fn player_pool(&self) -> Result<PoolSnapshot, ProviderError> {
        let payload = self.read_json(PLAYERS_FILE, "player pool").await?;
        Ok(PoolSnapshot::new(decode::decode_pool(&payload)))
    }

    async fn projection(
        &self,
        player_id: &str,
        request: ProjectionRequest,
    ) -> Result<Option<f64>, ProviderError> {
        let projections = self
            .projections
            .get_or_try_init(|| self.load_projections(request))
            .await?;
        Ok(projections
            .get(player_id)
            .and_then(|line| line.points(request.format)))
    }

    async fn defense_table(&self) -> Result<DefenseTable, ProviderError> {
        let payload = self.read_json(DEFENSE_FILE, "defensive rankings").await?;
        Ok(decode::decode_defense(&payload))
    }

    /// Snapshots are already a fixed window, so `lookback` is ignored.
    async fn trending(&self, _lookback: Duration) -> Result<TrendingFeed, ProviderError> {
        let payload = self.read_json(TRENDING_FILE, "trending").await?;
        let feed = match &payload {
            Value::Object(map) => TrendingFeed {
                adds: map.get("add").map(decode::decode_trending).unwrap_or_default(),
                drops: map.get("drop").map(decode::decode_trending).unwrap_or_default(),
            },
            other => TrendingFeed {
                adds: decode::decode_trending(other),
                drops: HashMap::new(),
            },
        };
        Ok(feed)
    }
}
