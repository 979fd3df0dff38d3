//! Request pipeline: fetch, resolve, fuse and score every rostered player.

pub mod player;
pub mod quality;

pub use player::{DegradedReason, EnrichedPlayer};
pub use quality::DataQuality;

use chrono::Datelike;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::identity::{CanonicalIdentity, IdentityResolver, MatchHints, NameIndex};
use crate::provider::types::{
    DefenseTable, PlayerRecord, PoolSnapshot, Position, ProjectionRequest, ScoringFormat,
    TrendingFeed,
};
use crate::provider::{DataProvider, ProviderError};
use crate::scoring::engine::DecisionInputs;
use crate::scoring::form::{consistency, momentum};
use crate::scoring::{
    calculate_score, fuse_with, normalize, risk_label, score_matchup, FusedProjection,
    FusionConfig, ScoringConfig, TierTable,
};

/// Default cap on in-flight projection lookups.
pub const MAX_CONCURRENT_LOOKUPS: usize = 10;

/// Everything the pipeline needs besides the provider.
#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub request: ProjectionRequest,
    pub trending_lookback: Duration,
    pub max_concurrent: usize,
    pub approximate_threshold: f64,
    pub fusion: FusionConfig,
    pub scoring: ScoringConfig,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            request: ProjectionRequest {
                season: chrono::Utc::now().year().clamp(0, u16::MAX as i32) as u16,
                week: 1,
                format: ScoringFormat::Ppr,
            },
            trending_lookback: Duration::from_secs(24 * 3600),
            max_concurrent: MAX_CONCURRENT_LOOKUPS,
            approximate_threshold: crate::identity::DEFAULT_APPROXIMATE_THRESHOLD,
            fusion: FusionConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Enriched roster plus the data-quality counters describing it.
#[derive(Debug, Clone)]
pub struct EnrichedPool {
    /// In roster order
    pub players: Vec<EnrichedPlayer>,
    pub quality: DataQuality,
}

impl EnrichedPool {
    pub fn by_position(&self) -> BTreeMap<Position, Vec<&EnrichedPlayer>> {
        group_by_position(&self.players)
    }
}

/// Group players by position, best decision score first within each group.
pub fn group_by_position(players: &[EnrichedPlayer]) -> BTreeMap<Position, Vec<&EnrichedPlayer>> {
    let mut groups: BTreeMap<Position, Vec<&EnrichedPlayer>> = BTreeMap::new();
    for player in players {
        groups.entry(player.position()).or_default().push(player);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| {
            b.decision_score()
                .total_cmp(&a.decision_score())
                .then_with(|| b.composite().total_cmp(&a.composite()))
        });
    }
    groups
}

/// Per-player result of the I/O stage.
struct Lookup {
    slot: usize,
    record: PlayerRecord,
    identity: CanonicalIdentity,
    projection_b: Option<f64>,
    projection_failed: bool,
}

/// Resolve one player and fetch their provider B projection.
async fn lookup_player<P: DataProvider>(
    provider: &P,
    resolver: &IdentityResolver,
    slot: usize,
    record: PlayerRecord,
    request: ProjectionRequest,
    rate_limited: Arc<AtomicBool>,
) -> Lookup {
    let hints = MatchHints::new(Some(record.position), Some(record.team.as_str()));
    let identity = resolver.resolve(&record.display_name, &hints);

    let mut lookup = Lookup {
        slot,
        record,
        identity,
        projection_b: None,
        projection_failed: false,
    };

    let Some(key) = lookup.identity.provider_key.as_deref() else {
        return lookup;
    };

    if rate_limited.load(Ordering::Relaxed) {
        lookup.projection_failed = true;
        return lookup; // Skip lookup once rate limited
    }

    match provider.projection(key, request).await {
        Ok(projection) => lookup.projection_b = projection,
        Err(ProviderError::RateLimited) => {
            warn!("Rate limit hit during projection lookups. Continuing with partial data.");
            rate_limited.store(true, Ordering::Relaxed);
            lookup.projection_failed = true;
        }
        Err(e) => {
            warn!("Failed to fetch projection for {}: {}", lookup.record.display_name, e);
            lookup.projection_failed = true;
        }
    }
    lookup
}

/// Fetch everything for the roster and build each player's decision view.
///
/// Only a missing roster is fatal. Every other category falls back to an
/// empty default, is listed in `DataQuality::unavailable_sources`, and marks
/// the affected players degraded.
pub async fn enrich_roster<P: DataProvider>(
    provider: &P,
    settings: &EnrichSettings,
) -> Result<EnrichedPool, ProviderError> {
    let roster = provider.roster().await?;
    info!("Roster: {} players", roster.len());

    let (pool, defense, trending) = tokio::join!(
        provider.player_pool(),
        provider.defense_table(),
        provider.trending(settings.trending_lookback)
    );

    let mut unavailable: Vec<&'static str> = Vec::new();
    let pool = pool.unwrap_or_else(|e| {
        warn!("Player pool unavailable, identities will not resolve: {}", e);
        unavailable.push("player pool");
        PoolSnapshot::empty()
    });
    let defense = defense.unwrap_or_else(|e| {
        warn!("Defensive rankings unavailable, matchups default to neutral: {}", e);
        unavailable.push("defensive rankings");
        DefenseTable::default()
    });
    let trending_ok = trending.is_ok();
    let trending = trending.unwrap_or_else(|e| {
        warn!("Trending feed unavailable: {}", e);
        unavailable.push("trending");
        TrendingFeed::default()
    });

    let index = Arc::new(NameIndex::build(&pool));
    debug!("Name index v{} with {} players", index.version(), index.len());
    let resolver = IdentityResolver::new(index.clone()).with_threshold(settings.approximate_threshold);

    let lookups = run_lookups(provider, &resolver, roster, settings).await;
    if lookups.iter().any(|l| l.projection_failed) && !unavailable.contains(&"projections") {
        unavailable.push("projections");
    }

    let players = build_players(lookups, &pool, &defense, &trending, trending_ok, settings);
    let quality = DataQuality::from_players(&players, index.version(), &unavailable);
    info!(
        "Enriched {} players: {} matched, {} degraded",
        quality.total_players, quality.matched_players, quality.degraded_players
    );

    Ok(EnrichedPool { players, quality })
}

async fn run_lookups<P: DataProvider>(
    provider: &P,
    resolver: &IdentityResolver,
    roster: Vec<PlayerRecord>,
    settings: &EnrichSettings,
) -> Vec<Lookup> {
    let max_concurrent = settings.max_concurrent.max(1);

    // Rate limit flag shared across concurrent lookups
    let rate_limited = Arc::new(AtomicBool::new(false));

    let mut futures = FuturesUnordered::new();
    let mut records = roster.into_iter().enumerate();
    let mut lookups = Vec::new();

    // Fill initial batch
    for _ in 0..max_concurrent {
        if let Some((slot, record)) = records.next() {
            futures.push(lookup_player(
                provider,
                resolver,
                slot,
                record,
                settings.request,
                rate_limited.clone(),
            ));
        }
    }

    // Process results and feed new lookups
    while let Some(lookup) = futures.next().await {
        lookups.push(lookup);
        if let Some((slot, record)) = records.next() {
            futures.push(lookup_player(
                provider,
                resolver,
                slot,
                record,
                settings.request,
                rate_limited.clone(),
            ));
        }
    }

    lookups.sort_by_key(|l| l.slot);
    lookups
}

fn build_players(
    lookups: Vec<Lookup>,
    pool: &PoolSnapshot,
    defense: &DefenseTable,
    trending: &TrendingFeed,
    trending_ok: bool,
    settings: &EnrichSettings,
) -> Vec<EnrichedPlayer> {
    // Fuse first: tiers depend on the whole week's composites
    let fused: Vec<FusedProjection> = lookups
        .iter()
        .map(|l| {
            fuse_with(
                &settings.fusion,
                l.identity.confidence(),
                l.record.projection,
                l.projection_b,
                &l.record.recent_scores,
            )
        })
        .collect();

    let mut composites: HashMap<Position, Vec<f64>> = HashMap::new();
    for (lookup, fused) in lookups.iter().zip(&fused) {
        if fused.composite > 0.0 {
            composites.entry(lookup.record.position).or_default().push(fused.composite);
        }
    }
    let tiers = TierTable::from_pool(&composites);

    lookups
        .into_iter()
        .zip(fused)
        .map(|(lookup, fused)| {
            let Lookup { record, identity, projection_b, projection_failed, .. } = lookup;
            let key = identity.provider_key.as_deref();

            let injury_status = record.injury_status.clone().or_else(|| {
                key.and_then(|k| pool.players.get(k))
                    .and_then(|p| p.injury_status.clone())
            });
            let matchup = score_matchup(defense, &record.opponent, record.position);
            let value = normalize(fused.composite, record.position);
            let tier = tiers.classify(fused.composite, record.position);
            let risk = risk_label(injury_status.as_deref());
            let player_momentum = momentum(&record.recent_scores);
            let player_consistency = consistency(&record.recent_scores);
            let trending_adds = key.map(|k| trending.adds_for(k)).unwrap_or(0);
            let trending_drops = key.map(|k| trending.drops_for(k)).unwrap_or(0);

            let mut degraded = Vec::new();
            if !identity.is_matched() {
                degraded.push(DegradedReason::Unmatched);
            }
            if identity.has_mismatch() {
                degraded.push(DegradedReason::HintMismatch);
            }
            if projection_failed {
                degraded.push(DegradedReason::ProjectionUnavailable);
            }
            if record.projection.is_none() && projection_b.is_none() {
                degraded.push(DegradedReason::NoProjection);
            }
            if !matchup.is_known() {
                degraded.push(DegradedReason::MatchupUnavailable);
            }
            if !trending_ok {
                degraded.push(DegradedReason::TrendingUnavailable);
            }

            let decision = calculate_score(
                &DecisionInputs {
                    position: record.position,
                    composite: fused.composite,
                    matchup_score: matchup.score,
                    trending_adds,
                    momentum: player_momentum,
                    injury_status: injury_status.as_deref(),
                    degraded: !degraded.is_empty(),
                },
                &settings.fusion,
                &settings.scoring,
            );

            EnrichedPlayer {
                confidence: identity.confidence(),
                record,
                identity,
                provider_b_projection: projection_b,
                injury_status,
                fused,
                matchup,
                value,
                tier,
                risk,
                momentum: player_momentum,
                consistency: player_consistency,
                trending_adds,
                trending_drops,
                decision,
                degraded,
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::identity::MatchMethod;
    use crate::provider::types::{DefenseRanks, PoolPlayer};
    use crate::scoring::{RiskLabel, Tier};
    use std::sync::atomic::AtomicUsize;

    /// Provider serving fixed data, with per-category failure switches.
    #[derive(Default)]
    pub(crate) struct InMemoryProvider {
        pub roster: Vec<PlayerRecord>,
        pub pool: HashMap<String, PoolPlayer>,
        pub projections: HashMap<String, f64>,
        pub defense: HashMap<String, DefenseRanks>,
        pub adds: HashMap<String, u64>,
        pub fail_pool: bool,
        pub fail_defense: bool,
        pub fail_trending: bool,
        pub rate_limit_projections: bool,
        pub projection_calls: AtomicUsize,
    }

    impl DataProvider for InMemoryProvider {
        async fn roster(&self) -> Result<Vec<PlayerRecord>, ProviderError> {
            Ok(self.roster.clone())
        }

        async fn player_pool(&self) -> Result<PoolSnapshot, ProviderError> {
            if self.fail_pool {
                return Err(ProviderError::Unavailable("player pool"));
            }
            Ok(PoolSnapshot::new(self.pool.clone()))
        }

        async fn projection(
            &self,
            player_id: &str,
            _request: ProjectionRequest,
        ) -> Result<Option<f64>, ProviderError> {
            self.projection_calls.fetch_add(1, Ordering::Relaxed);
            if self.rate_limit_projections {
                return Err(ProviderError::RateLimited);
            }
            Ok(self.projections.get(player_id).copied())
        }

        async fn defense_table(&self) -> Result<DefenseTable, ProviderError> {
            if self.fail_defense {
                return Err(ProviderError::Unavailable("defensive rankings"));
            }
            Ok(DefenseTable::new(self.defense.clone()))
        }

        async fn trending(&self, _lookback: Duration) -> Result<TrendingFeed, ProviderError> {
            if self.fail_trending {
                return Err(ProviderError::Unavailable("trending"));
            }
            Ok(TrendingFeed {
                adds: self.adds.clone(),
                drops: HashMap::new(),
            })
        }
    }

    fn pool_player(first: &str, last: &str, position: Position, team: &str) -> PoolPlayer {
        PoolPlayer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            position,
            team: Some(team.to_string()),
            active: true,
            injury_status: None,
        }
    }

    fn record(name: &str, position: Position, team: &str, opponent: &str, projection: Option<f64>) -> PlayerRecord {
        let mut record = PlayerRecord::new(name, position, team);
        record.opponent = opponent.to_string();
        record.projection = projection;
        record
    }

    fn provider() -> InMemoryProvider {
        let mut p = InMemoryProvider::default();
        p.roster = vec![
            record("Josh Allen", Position::Qb, "BUF", "@MIA", Some(24.0)),
            record("C. McCaffrey", Position::Rb, "SF", "SEA", Some(20.0)),
            record("Unknown Rookie", Position::Wr, "NYJ", "NE", Some(6.0)),
        ];
        p.pool.insert("4984".to_string(), pool_player("Josh", "Allen", Position::Qb, "BUF"));
        p.pool.insert("4034".to_string(), pool_player("Christian", "McCaffrey", Position::Rb, "SF"));
        p.projections.insert("4984".to_string(), 22.0);
        p.projections.insert("4034".to_string(), 20.0);
        p.defense.insert(
            "MIA".to_string(),
            DefenseRanks { vs_qb: Some(5), vs_rb: Some(10), vs_wr: Some(20), vs_te: Some(30) },
        );
        p.defense.insert(
            "SEA".to_string(),
            DefenseRanks { vs_qb: Some(12), vs_rb: Some(28), vs_wr: Some(2), vs_te: Some(14) },
        );
        p.adds.insert("4034".to_string(), 2500);
        p
    }

    #[tokio::test]
    async fn test_enrich_full_data() {
        let provider = provider();
        let pool = enrich_roster(&provider, &EnrichSettings::default()).await.unwrap();

        assert_eq!(pool.players.len(), 3);
        let allen = &pool.players[0];
        assert_eq!(allen.name(), "Josh Allen");
        assert_eq!(allen.identity.method, MatchMethod::Exact);
        assert_eq!(allen.provider_b_projection, Some(22.0));
        assert!((allen.composite() - 23.0).abs() < 1e-9);
        assert_eq!(allen.tier, Tier::Elite);
        assert_eq!(allen.risk, RiskLabel::Low);
        assert!(allen.fused.floor <= allen.composite());
        assert!(!allen.is_degraded());

        let cmc = &pool.players[1];
        assert_eq!(cmc.identity.method, MatchMethod::Variant);
        assert_eq!(cmc.trending_adds, 2500);

        let rookie = &pool.players[2];
        assert!(!rookie.is_matched());
        assert!(rookie.degraded.contains(&DegradedReason::Unmatched));
        assert!(rookie.degraded.contains(&DegradedReason::MatchupUnavailable));
        assert!((rookie.composite() - 6.0).abs() < 1e-9);

        let q = &pool.quality;
        assert_eq!(q.total_players, 3);
        assert_eq!(q.matched_players, 2);
        assert_eq!(q.method_count(MatchMethod::Exact), 1);
        assert_eq!(q.method_count(MatchMethod::Variant), 1);
        assert_eq!(q.method_count(MatchMethod::None), 1);
        assert_eq!(q.with_projection, 3);
        assert_eq!(q.with_both_projections, 2);
        assert_eq!(q.degraded_players, 1);
        assert!((q.average_confidence - 0.6).abs() < 1e-9);
        assert!(q.unavailable_sources.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_survives_missing_categories() {
        let mut provider = provider();
        provider.fail_pool = true;
        provider.fail_defense = true;
        provider.fail_trending = true;

        let pool = enrich_roster(&provider, &EnrichSettings::default()).await.unwrap();
        assert_eq!(pool.players.len(), 3);
        assert_eq!(provider.projection_calls.load(Ordering::Relaxed), 0);
        for player in &pool.players {
            assert!(!player.is_matched());
            assert_eq!(player.matchup.score, 50);
            assert!(player.degraded.contains(&DegradedReason::TrendingUnavailable));
            // Provider A projection alone carries the composite
            assert_eq!(Some(player.composite()), player.record.projection);
        }
        assert_eq!(pool.quality.unavailable_sources.len(), 3);
        assert_eq!(pool.quality.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_rate_limit_stops_further_lookups() {
        let mut provider = provider();
        provider.rate_limit_projections = true;
        let settings = EnrichSettings {
            max_concurrent: 1,
            ..EnrichSettings::default()
        };

        let pool = enrich_roster(&provider, &settings).await.unwrap();
        assert_eq!(provider.projection_calls.load(Ordering::Relaxed), 1);
        assert!(pool.players[0].degraded.contains(&DegradedReason::ProjectionUnavailable));
        assert!(pool.players[1].degraded.contains(&DegradedReason::ProjectionUnavailable));
        assert!(pool.quality.unavailable_sources.contains(&"projections".to_string()));
    }

    #[tokio::test]
    async fn test_group_by_position_orders_by_score() {
        let mut provider = provider();
        provider.roster.push(record("Backup Qb", Position::Qb, "BUF", "@MIA", Some(9.0)));
        let pool = enrich_roster(&provider, &EnrichSettings::default()).await.unwrap();

        let groups = pool.by_position();
        let qbs = &groups[&Position::Qb];
        assert_eq!(qbs.len(), 2);
        assert_eq!(qbs[0].name(), "Josh Allen");
        assert_eq!(groups.keys().next(), Some(&Position::Qb));
    }

    #[tokio::test]
    async fn test_teamless_roster_entry_is_enriched_and_counted() {
        let mut provider = provider();
        provider.pool.insert("9493".to_string(), pool_player("Puka", "Nacua", Position::Wr, "LAR"));
        provider.roster.push(record("Puka Nacua", Position::Wr, "", "", Some(15.0)));
        provider.roster.push(record("Mystery Rookie", Position::Wr, "", "", None));

        let pool = enrich_roster(&provider, &EnrichSettings::default()).await.unwrap();
        assert_eq!(pool.players.len(), 5);
        assert_eq!(pool.quality.total_players, 5);

        // No team hint: the name alone resolves, without a team mismatch
        let puka = &pool.players[3];
        assert_eq!(puka.identity.method, MatchMethod::Exact);
        assert!(!puka.identity.team_mismatch);
        assert!((puka.composite() - 15.0).abs() < 1e-9);

        let rookie = &pool.players[4];
        assert!(!rookie.is_matched());
        assert!(rookie.degraded.contains(&DegradedReason::NoProjection));

        let lineup = crate::lineup::assign_pool(&pool, &crate::lineup::SlotRequirement::default());
        let placed = lineup.starters.len() + lineup.bench.len();
        assert_eq!(placed, 5);
        assert!(lineup.starters.iter().any(|f| f.player.name() == "Puka Nacua"));
    }
}
