//! Recent-form signals derived from a player's weekly score history.
//!
//! Scores are ordered newest first, as the roster feed reports them.

/// EWMA smoothing factor for momentum.
pub const MOMENTUM_ALPHA: f64 = 0.3;

fn mean(scores: &[f64]) -> f64 {
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Population standard deviation of at least three scores.
pub fn volatility(scores: &[f64]) -> Option<f64> {
    if scores.len() < 3 {
        return None;
    }
    let m = mean(scores);
    let variance = scores.iter().map(|s| (s - m).powi(2)).sum::<f64>() / scores.len() as f64;
    Some(variance.sqrt())
}

/// Momentum on a 0-100 scale, 50 neutral.
///
/// The EWMA is seeded with the newest score and folds in each older week at
/// `alpha`, then is compared with the plain mean: a ratio of 2.0 or more
/// maps to 100, 1.0 to 50, 0.0 to 0.
pub fn momentum(scores: &[f64]) -> f64 {
    let [first, rest @ ..] = scores else {
        return 50.0;
    };
    if rest.is_empty() {
        return 50.0;
    }
    let avg = mean(scores);
    if avg <= 0.0 {
        return 50.0;
    }

    let ewma = rest
        .iter()
        .fold(*first, |ewma, score| MOMENTUM_ALPHA * score + (1.0 - MOMENTUM_ALPHA) * ewma);

    let ratio = ewma / avg;
    if ratio >= 1.0 {
        (50.0 + (ratio - 1.0) * 50.0).min(100.0)
    } else {
        (ratio * 50.0).max(0.0)
    }
}

/// Consistency on a 0-100 scale: (1 - coefficient of variation) * 100.
pub fn consistency(scores: &[f64]) -> f64 {
    let Some(sd) = volatility(scores) else {
        return 50.0;
    };
    let avg = mean(scores);
    if avg <= 0.0 {
        return 50.0;
    }
    ((1.0 - sd / avg) * 100.0).clamp(0.0, 100.0)
}
