use chrono::{DateTime, Utc};

/// Relevance assigned to signals with no timestamp: neither fresh nor stale.
pub const UNKNOWN_AGE_RELEVANCE: f64 = 50.0;

/// Age in fractional days, clamped at zero for timestamps in the future.
pub fn age_days(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> f64 {
    let minutes = (*now - *timestamp).num_minutes() as f64;
    (minutes / 1440.0).max(0.0)
}

/// Piecewise exponential decay of a signal's relevance by age.
///
/// - ≤ 7 days: 100
/// - ≤ 30 days: `80·e^(-age/30)`
/// - ≤ 90 days: `60·e^(-age/90)`
/// - older: `20·e^(-age/365)`
///
/// Never drops below 5.
pub fn temporal_relevance(age_days: f64) -> f64 {
    let score = if age_days <= 7.0 {
        100.0
    } else if age_days <= 30.0 {
        80.0 * (-age_days / 30.0).exp()
    } else if age_days <= 90.0 {
        60.0 * (-age_days / 90.0).exp()
    } else {
        20.0 * (-age_days / 365.0).exp()
    };
    score.max(5.0)
}

/// Ranking freshness from creation and last-update age, 0–100.
///
/// `0.3·max(0, 100 − 2·created) + 0.7·max(0, 100 − updated)`
pub fn freshness(days_since_created: f64, days_since_updated: f64) -> f64 {
    let created = (100.0 - 2.0 * days_since_created).max(0.0);
    let updated = (100.0 - days_since_updated).max(0.0);
    0.3 * created + 0.7 * updated
}

/// Linear age decay used by the created/updated ranking criteria:
/// 100 at age zero, reaching 0 after `horizon_days`.
pub fn linear_age_score(age_days: f64, horizon_days: f64) -> f64 {
    if horizon_days <= 0.0 {
        return 0.0;
    }
    (100.0 * (1.0 - age_days / horizon_days)).clamp(0.0, 100.0)
}
