use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::enrich::{EnrichSettings, MAX_CONCURRENT_LOOKUPS};
use crate::identity::DEFAULT_APPROXIMATE_THRESHOLD;
use crate::lineup::{validate_slots, SlotConfig};
use crate::provider::sleeper::DEFAULT_BASE_URL;
use crate::provider::types::{ProjectionRequest, ScoringFormat};
use crate::scoring::{validate_fusion, validate_scoring, FusionConfig, ScoringConfig};

const DEFAULT_TRENDING_LOOKBACK: &str = "24h";
const DEFAULT_TIMEOUT: &str = "10s";
const MAX_WEEK: u8 = 18;

/// Top-level config file. Every section may be left out.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub slots: SlotConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Where data comes from and which week to score.
///
/// Example YAML:
/// ```yaml
/// provider:
///   snapshot_dir: ~/fantasy/week7
///   season: 2025
///   week: 7
///   scoring_format: half_ppr
///   trending_lookback: 48h
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Directory holding roster.json and friends (default: ~/.config/lineup-bro/snapshot)
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    #[serde(default)]
    pub sleeper_base_url: Option<String>,

    /// Defaults to the current year
    #[serde(default)]
    pub season: Option<u16>,

    #[serde(default)]
    pub week: Option<u8>,

    #[serde(default)]
    pub scoring_format: Option<ScoringFormat>,

    /// Trending window as a duration string (default: "24h")
    #[serde(default)]
    pub trending_lookback: Option<String>,

    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// HTTP request timeout (default: "10s")
    #[serde(default)]
    pub timeout: Option<String>,
}

impl ProviderConfig {
    pub fn sleeper_base_url(&self) -> &str {
        self.sleeper_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn season(&self) -> u16 {
        self.season
            .unwrap_or_else(|| chrono::Utc::now().year().clamp(0, u16::MAX as i32) as u16)
    }

    pub fn week(&self) -> u8 {
        self.week.unwrap_or(1)
    }

    pub fn scoring_format(&self) -> ScoringFormat {
        self.scoring_format.unwrap_or_default()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.unwrap_or(MAX_CONCURRENT_LOOKUPS)
    }

    pub fn trending_lookback(&self) -> Result<Duration> {
        let raw = self.trending_lookback.as_deref().unwrap_or(DEFAULT_TRENDING_LOOKBACK);
        humantime::parse_duration(raw)
            .with_context(|| format!("provider.trending_lookback: invalid duration '{}'", raw))
    }

    pub fn timeout(&self) -> Result<Duration> {
        let raw = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        humantime::parse_duration(raw)
            .with_context(|| format!("provider.timeout: invalid duration '{}'", raw))
    }

    pub fn request(&self) -> ProjectionRequest {
        ProjectionRequest {
            season: self.season(),
            week: self.week(),
            format: self.scoring_format(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Minimum similarity for an approximate name match (default: 0.88)
    #[serde(default)]
    pub approximate_threshold: Option<f64>,
}

impl MatchingConfig {
    pub fn approximate_threshold(&self) -> f64 {
        self.approximate_threshold.unwrap_or(DEFAULT_APPROXIMATE_THRESHOLD)
    }
}

impl Config {
    /// Pipeline settings for this config. Run `validate_config` first.
    pub fn enrich_settings(&self) -> Result<EnrichSettings> {
        Ok(EnrichSettings {
            request: self.provider.request(),
            trending_lookback: self.provider.trending_lookback()?,
            max_concurrent: self.provider.max_concurrent(),
            approximate_threshold: self.matching.approximate_threshold(),
            fusion: self.fusion.clone(),
            scoring: self.scoring.clone(),
        })
    }
}

/// Validate the whole config file.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let provider = &config.provider;
    if let Some(week) = provider.week {
        if week == 0 || week > MAX_WEEK {
            errors.push(format!("provider.week: must be between 1 and {}, got {}", MAX_WEEK, week));
        }
    }
    if provider.max_concurrent == Some(0) {
        errors.push("provider.max_concurrent: must be at least 1".to_string());
    }
    if let Err(e) = provider.trending_lookback() {
        errors.push(format!("{:#}", e));
    }
    match provider.timeout() {
        Ok(timeout) if timeout.is_zero() => {
            errors.push("provider.timeout: must be greater than zero".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("{:#}", e)),
    }
    let base_url = provider.sleeper_base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(format!("provider.sleeper_base_url: must be an http(s) URL, got '{}'", base_url));
    }

    if let Some(threshold) = config.matching.approximate_threshold {
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            errors.push(format!(
                "matching.approximate_threshold: must be in (0, 1], got {}",
                threshold
            ));
        }
    }

    for result in [
        validate_slots(&config.slots),
        validate_fusion(&config.fusion),
        validate_scoring(&config.scoring),
    ] {
        if let Err(mut section) = result {
            errors.append(&mut section);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert!(validate_config(&config).is_ok());

        let settings = config.enrich_settings().unwrap();
        assert_eq!(settings.request.week, 1);
        assert_eq!(settings.request.format, ScoringFormat::Ppr);
        assert_eq!(settings.trending_lookback, Duration::from_secs(24 * 3600));
        assert_eq!(settings.max_concurrent, MAX_CONCURRENT_LOOKUPS);
        assert!((settings.approximate_threshold - 0.88).abs() < 1e-9);
        assert_eq!(config.provider.sleeper_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
provider:
  snapshot_dir: /tmp/week7
  season: 2025
  week: 7
  scoring_format: half_ppr
  trending_lookback: 48h
  max_concurrent: 4
  timeout: 5s
slots:
  wr: 3
  flex: 2
fusion:
  provider_a_weight: 0.5
  provider_b_weight: 0.3
matching:
  approximate_threshold: 0.9
scoring:
  matchup_weight: 0.15
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert!(validate_config(&config).is_ok());

        let settings = config.enrich_settings().unwrap();
        assert_eq!(settings.request.season, 2025);
        assert_eq!(settings.request.week, 7);
        assert_eq!(settings.request.format, ScoringFormat::HalfPpr);
        assert_eq!(settings.trending_lookback, Duration::from_secs(48 * 3600));
        assert_eq!(settings.max_concurrent, 4);
        assert_eq!(config.provider.timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(config.slots.wr, Some(3));
        assert!((settings.fusion.provider_a_weight() - 0.5).abs() < 1e-9);
        assert!((settings.scoring.matchup_weight() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
provider:
  wek: 3
"#;
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validation_collects_every_section() {
        let yaml = r#"
provider:
  week: 23
  max_concurrent: 0
  trending_lookback: soon
matching:
  approximate_threshold: 1.5
slots:
  flex_positions: [QB, XX]
fusion:
  provider_a_weight: 0.9
  provider_b_weight: 0.9
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("provider.week")));
        assert!(errors.iter().any(|e| e.starts_with("provider.max_concurrent")));
        assert!(errors.iter().any(|e| e.starts_with("provider.trending_lookback")));
        assert!(errors.iter().any(|e| e.starts_with("matching.approximate_threshold")));
        assert!(errors.iter().any(|e| e.contains("'XX'")));
        assert!(errors.iter().any(|e| e.starts_with("fusion:")));
    }
}
