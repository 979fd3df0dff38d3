use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::debug;

use super::decode;
use super::snapshot::SnapshotProvider;
use super::types::{
    DefenseTable, PlayerRecord, PoolSnapshot, ProjectionLine, ProjectionRequest, TrendingFeed,
};
use super::{DataProvider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.sleeper.app/v1";

const TRENDING_LIMIT: u32 = 100;

/// Live provider B over the public Sleeper HTTP API.
///
/// Sleeper has no roster or defensive-strength endpoints usable without a
/// league, so those categories are read from a local snapshot directory.
/// Weekly projections come back in one bulk response and are fetched once.
pub struct SleeperProvider {
    client: reqwest::Client,
    base_url: String,
    local: SnapshotProvider,
    projections: OnceCell<HashMap<String, ProjectionLine>>,
}

impl SleeperProvider {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        snapshot_dir: impl Into<PathBuf>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lineup-bro/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            local: SnapshotProvider::new(snapshot_dir),
            projections: OnceCell::new(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// GET a JSON endpoint with exponential backoff on failure.
    async fn get_json(&self, endpoint: &str) -> Result<Value, ProviderError> {
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        let url = self.url(endpoint);
        Retry::spawn(retry_strategy, || async {
            debug!("GET {}", url);
            let response = self.client.get(&url).send().await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }
            let response = response.error_for_status()?;
            Ok(response.json::<Value>().await?)
        })
        .await
    }

    async fn fetch_projections(
        &self,
        request: ProjectionRequest,
    ) -> Result<HashMap<String, ProjectionLine>, ProviderError> {
        let payload = self
            .get_json(&format!("projections/nfl/{}/{}", request.season, request.week))
            .await?;
        let projections = decode::decode_projections(&payload);
        if projections.is_empty() {
            return Err(ProviderError::Unavailable("projections"));
        }
        debug!("Fetched {} projection lines", projections.len());
        Ok(projections)
    }

    async fn fetch_trending(
        &self,
        kind: &str,
        lookback: Duration,
    ) -> Result<HashMap<String, u64>, ProviderError> {
        let hours = lookback_hours(lookback);
        let payload = self
            .get_json(&format!(
                "players/nfl/trending/{}?lookback_hours={}&limit={}",
                kind, hours, TRENDING_LIMIT
            ))
            .await?;
        Ok(decode::decode_trending(&payload))
    }
}

fn lookback_hours(lookback: Duration) -> u64 {
    (lookback.as_secs() / 3600).max(1)
}

impl DataProvider for SleeperProvider {
    async fn roster(&self) -> Result<Vec<PlayerRecord>, ProviderError> {
        self.local.roster().await
    }

    async fn player_pool(&self) -> Result<PoolSnapshot, ProviderError> {
        let payload = self.get_json("players/nfl").await?;
        let players = decode::decode_pool(&payload);
        if players.is_empty() {
            return Err(ProviderError::Unavailable("player pool"));
        }
        Ok(PoolSnapshot::new(players))
    }

    async fn projection(
        &self,
        player_id: &str,
        request: ProjectionRequest,
    ) -> Result<Option<f64>, ProviderError> {
        let projections = self
            .projections
            .get_or_try_init(|| self.fetch_projections(request))
            .await?;
        Ok(projections
            .get(player_id)
            .and_then(|line| line.points(request.format)))
    }

    async fn defense_table(&self) -> Result<DefenseTable, ProviderError> {
        self.local.defense_table().await
    }

    async fn trending(&self, lookback: Duration) -> Result<TrendingFeed, ProviderError> {
        let (adds, drops) = tokio::join!(
            self.fetch_trending("add", lookback),
            self.fetch_trending("drop", lookback)
        );
        Ok(TrendingFeed {
            adds: adds?,
            drops: drops.unwrap_or_default(),
        })
    }
}
