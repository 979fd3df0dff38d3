use super::config::{FusionConfig, ScoringConfig};

fn check_unit(errors: &mut Vec<String>, field: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            errors.push(format!("{}: must be between 0 and 1, got {}", field, v));
        }
    }
}

/// Validate fusion configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_fusion(config: &FusionConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_unit(&mut errors, "fusion.provider_a_weight", config.provider_a_weight);
    check_unit(&mut errors, "fusion.provider_b_weight", config.provider_b_weight);
    check_unit(&mut errors, "fusion.min_weight", config.min_weight);
    check_unit(&mut errors, "fusion.max_weight", config.max_weight);

    if config.total_weight() > 1.0 + 1e-9 {
        errors.push(format!(
            "fusion: provider_a_weight + provider_b_weight must not exceed 1, got {}",
            config.total_weight()
        ));
    }
    if config.total_weight() <= 0.0 {
        errors.push("fusion: provider weights must not both be zero".to_string());
    }
    if config.min_weight() > config.max_weight() {
        errors.push(format!(
            "fusion.min_weight: {} is greater than max_weight {}",
            config.min_weight(),
            config.max_weight()
        ));
    }

    let floor = config.floor_ratio();
    if !(0.0..=1.0).contains(&floor) {
        errors.push(format!("fusion.floor_ratio: must be between 0 and 1, got {}", floor));
    }
    let ceiling = config.ceiling_ratio();
    if !ceiling.is_finite() || ceiling < 1.0 {
        errors.push(format!("fusion.ceiling_ratio: must be at least 1, got {}", ceiling));
    }
    for (field, sigma) in [
        ("fusion.floor_sigma", config.floor_sigma()),
        ("fusion.ceiling_sigma", config.ceiling_sigma()),
    ] {
        if !sigma.is_finite() || sigma < 0.0 {
            errors.push(format!("{}: must be non-negative, got {}", field, sigma));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate decision-score weights at startup.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_unit(&mut errors, "scoring.matchup_weight", config.matchup_weight);
    check_unit(&mut errors, "scoring.trending_weight", config.trending_weight);
    check_unit(&mut errors, "scoring.momentum_weight", config.momentum_weight);

    if let Some(scale) = config.trending_scale {
        if !scale.is_finite() || scale <= 0.0 {
            errors.push(format!("scoring.trending_scale: must be positive, got {}", scale));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
