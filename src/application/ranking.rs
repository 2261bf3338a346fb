//! Filtering, multi-criteria ranking and personalisation of persisted
//! opportunities.
//!
//! Results and user preferences go through the cache port. The cache is an
//! optimisation only: every cache error is logged and treated as a miss.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::entities::opportunity::Opportunity;
use crate::domain::error::DomainError;
use crate::domain::ports::cache::Cache;
use crate::domain::ports::opportunity_repository::OpportunityRepository;
use crate::domain::values::decay::{age_days, freshness, linear_age_score};
use crate::domain::values::level::Level;
use crate::domain::values::ranking::{
    FilterCriteria, RankingConfig, RankingCriteria, SortOrder, UserPreferences,
};

const TRENDING_WINDOW_DAYS: i64 = 7;
const AGE_HORIZON_DAYS: f64 = 365.0;
const BOOKMARK_BONUS: f64 = 20.0;
const VALIDATED_BONUS: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOpportunity {
    pub opportunity: Opportunity,
    /// 1-based position across all pages.
    pub rank_position: usize,
    pub rank_score: f64,
    pub base_score: f64,
    pub personalization_score: f64,
    pub freshness_score: f64,
    pub trending_score: f64,
    /// Metric value read for each weighted criterion, 0–100.
    pub score_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub opportunities: Vec<RankedOpportunity>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    #[serde(default)]
    pub from_cache: bool,
}

/// Read one ranking criterion from an opportunity on a 0–100 scale.
pub fn metric_value(o: &Opportunity, criteria: RankingCriteria, now: &DateTime<Utc>) -> f64 {
    let v = match criteria {
        RankingCriteria::ValidationScore => o.validation_score * 10.0,
        RankingCriteria::AiFeasibility => o.ai_feasibility_score * 10.0,
        RankingCriteria::OverallScore => {
            (o.validation_score + o.ai_feasibility_score + o.confidence_rating) / 3.0 * 10.0
        }
        RankingCriteria::MarketSize => o.market_size_usd().map(market_size_score).unwrap_or(0.0),
        RankingCriteria::CompetitionLevel => o
            .competition_level
            .unwrap_or(Level::Medium)
            .inverted_score(),
        RankingCriteria::ImplementationComplexity => o
            .implementation_complexity
            .unwrap_or(Level::Medium)
            .inverted_score(),
        RankingCriteria::CreatedAt => linear_age_score(age_days(&o.created_at, now), AGE_HORIZON_DAYS),
        RankingCriteria::UpdatedAt => linear_age_score(age_days(&o.updated_at, now), AGE_HORIZON_DAYS),
        RankingCriteria::Engagement => o.signal_engagement / 10.0,
    };
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Log-scale a USD market size: $100k or less → 0, $100B or more → 100.
pub fn market_size_score(usd: f64) -> f64 {
    if usd <= 0.0 {
        return 0.0;
    }
    ((usd.log10() - 5.0) / 6.0 * 100.0).clamp(0.0, 100.0)
}

/// Share of `have` that the user prefers.
fn overlap<T: Eq + Hash>(have: &[T], preferred: &[T]) -> f64 {
    if have.is_empty() || preferred.is_empty() {
        return 0.0;
    }
    let have: HashSet<&T> = have.iter().collect();
    let preferred: HashSet<&T> = preferred.iter().collect();
    have.intersection(&preferred).count() as f64 / have.len() as f64
}

/// Preference match for one opportunity, 0–100.
pub fn personalization_score(
    o: &Opportunity,
    prefs: &UserPreferences,
    bookmarked: bool,
    validated: bool,
) -> f64 {
    let mut score = overlap(&o.ai_solution_types, &prefs.preferred_ai_types) * prefs.ai_type_weight
        + overlap(&o.target_industries, &prefs.preferred_industries) * prefs.industry_weight;
    if o
        .implementation_complexity
        .is_some_and(|c| prefs.preferred_complexity.contains(&c))
    {
        score += prefs.complexity_weight;
    }
    let mut score = score * 100.0;
    if bookmarked {
        score += BOOKMARK_BONUS;
    }
    if validated {
        score += VALIDATED_BONUS;
    }
    score.clamp(0.0, 100.0)
}

/// `min(100, count·10 + mean_score·5)` over recent validations.
pub fn trending_score(count: usize, score_sum: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let mean = score_sum / count as f64;
    (count as f64 * 10.0 + mean * 5.0).clamp(0.0, 100.0)
}

struct Personal {
    prefs: UserPreferences,
    bookmarks: HashSet<String>,
    validated: HashSet<String>,
}

pub struct RankingSystem {
    repo: Arc<dyn OpportunityRepository>,
    cache: Arc<dyn Cache>,
    preferences_ttl_secs: u64,
}

impl RankingSystem {
    pub fn new(repo: Arc<dyn OpportunityRepository>, cache: Arc<dyn Cache>, preferences_ttl_secs: u64) -> Self {
        Self {
            repo,
            cache,
            preferences_ttl_secs,
        }
    }

    pub fn rank(
        &self,
        filter: &FilterCriteria,
        config: &RankingConfig,
        preferences: Option<&UserPreferences>,
        page: usize,
        page_size: usize,
    ) -> Result<RankingResult, DomainError> {
        self.rank_at(filter, config, preferences, page, page_size, Utc::now())
    }

    pub fn rank_at(
        &self,
        filter: &FilterCriteria,
        config: &RankingConfig,
        preferences: Option<&UserPreferences>,
        page: usize,
        page_size: usize,
        now: DateTime<Utc>,
    ) -> Result<RankingResult, DomainError> {
        config.validate()?;
        if page == 0 || page_size == 0 {
            return Err(DomainError::InvalidInput(
                "Page and page size start at 1".into(),
            ));
        }

        let key = if config.use_cache {
            cache_key(filter, config, preferences, page, page_size)
        } else {
            None
        };
        if let Some(key) = &key {
            if let Some(mut cached) = self.cached_result(key) {
                cached.from_cache = true;
                return Ok(cached);
            }
        }

        let (rows, _) = self.repo.query(filter, None)?;
        let trending = self.trending_counts(now)?;
        let personal = match preferences {
            Some(prefs) if config.enable_personalization && config.personalization_weight > 0.0 => {
                Some(self.personal(prefs)?)
            }
            _ => None,
        };

        let mut ranked: Vec<RankedOpportunity> = rows
            .into_iter()
            .map(|o| score_one(o, config, personal.as_ref(), &trending, &now))
            .collect();

        ranked.sort_by(|a, b| {
            let by_score = match config.sort_order {
                SortOrder::Desc => b.rank_score.total_cmp(&a.rank_score),
                SortOrder::Asc => a.rank_score.total_cmp(&b.rank_score),
            };
            by_score
                .then_with(|| b.opportunity.created_at.cmp(&a.opportunity.created_at))
                .then_with(|| a.opportunity.id.cmp(&b.opportunity.id))
        });

        let total_count = ranked.len();
        let offset = (page - 1).saturating_mul(page_size);
        let opportunities: Vec<RankedOpportunity> = ranked
            .into_iter()
            .skip(offset)
            .take(page_size)
            .enumerate()
            .map(|(i, mut r)| {
                r.rank_position = offset + i + 1;
                r
            })
            .collect();

        let total_pages = total_count.div_ceil(page_size);
        let result = RankingResult {
            opportunities,
            total_count,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            from_cache: false,
        };

        if let Some(key) = &key {
            self.store_result(key, &result, config.cache_ttl_secs);
        }
        Ok(result)
    }

    /// Opportunities with the most validation activity in the last week.
    pub fn get_trending_opportunities(&self, limit: usize) -> Result<RankingResult, DomainError> {
        let config = RankingConfig {
            personalization_weight: 0.0,
            freshness_weight: 0.1,
            trending_weight: 0.6,
            enable_personalization: false,
            ..Default::default()
        };
        self.rank(&FilterCriteria::default(), &config, None, 1, limit)
    }

    pub fn get_personalized_recommendations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<RankingResult, DomainError> {
        let prefs = self.user_preferences(user_id);
        let config = RankingConfig {
            personalization_weight: 0.5,
            freshness_weight: 0.1,
            trending_weight: 0.1,
            enable_personalization: true,
            ..Default::default()
        };
        self.rank(&FilterCriteria::default(), &config, Some(&prefs), 1, limit)
    }

    /// Read-through preference lookup. Falls back to empty preferences when
    /// neither the cache nor the store can answer.
    pub fn user_preferences(&self, user_id: &str) -> UserPreferences {
        let key = preferences_key(user_id);
        match self.cache.get(&key) {
            Ok(Some(value)) => match serde_json::from_value::<UserPreferences>(value) {
                Ok(prefs) => return prefs,
                Err(e) => warn!(user_id, error = %e, "Discarding malformed cached preferences"),
            },
            Ok(None) => {}
            Err(e) => warn!(user_id, error = %e, "Preference cache unavailable"),
        }

        match self.repo.get_preferences(user_id) {
            Ok(Some(prefs)) => {
                match serde_json::to_value(&prefs) {
                    Ok(value) => {
                        if let Err(e) = self.cache.set(&key, &value, self.preferences_ttl_secs) {
                            warn!(user_id, error = %e, "Failed to cache preferences");
                        }
                    }
                    Err(e) => warn!(user_id, error = %e, "Failed to serialise preferences"),
                }
                prefs
            }
            Ok(None) => UserPreferences::for_user(user_id),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to load preferences, using defaults");
                UserPreferences::for_user(user_id)
            }
        }
    }

    pub fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DomainError> {
        self.repo.save_preferences(preferences)?;
        if let Err(e) = self.cache.delete(&preferences_key(&preferences.user_id)) {
            warn!(user_id = %preferences.user_id, error = %e, "Failed to invalidate cached preferences");
        }
        Ok(())
    }

    fn cached_result(&self, key: &str) -> Option<RankingResult> {
        match self.cache.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(result) => {
                    debug!(key, "Ranking cache hit");
                    Some(result)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding malformed cached ranking");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Ranking cache unavailable, recomputing");
                None
            }
        }
    }

    fn store_result(&self, key: &str, result: &RankingResult, ttl_secs: u64) {
        let stored = serde_json::to_value(result)
            .map_err(DomainError::from)
            .and_then(|value| self.cache.set(key, &value, ttl_secs));
        if let Err(e) = stored {
            warn!(key, error = %e, "Failed to cache ranking");
        }
    }

    /// Validation count and score sum per opportunity over the trending window.
    fn trending_counts(&self, now: DateTime<Utc>) -> Result<HashMap<String, (usize, f64)>, DomainError> {
        let since = now - Duration::days(TRENDING_WINDOW_DAYS);
        let mut counts: HashMap<String, (usize, f64)> = HashMap::new();
        for v in self.repo.validations_since(since)? {
            let slot = counts.entry(v.opportunity_id).or_default();
            slot.0 += 1;
            slot.1 += v.score;
        }
        Ok(counts)
    }

    fn personal(&self, prefs: &UserPreferences) -> Result<Personal, DomainError> {
        let (bookmarks, validated) = if prefs.user_id.is_empty() {
            (HashSet::new(), HashSet::new())
        } else {
            let bookmarks = self.repo.bookmarks_for_user(&prefs.user_id)?.into_iter().collect();
            let validated = self
                .repo
                .validations_by_user(&prefs.user_id)?
                .into_iter()
                .map(|v| v.opportunity_id)
                .collect();
            (bookmarks, validated)
        };
        Ok(Personal {
            prefs: prefs.clone(),
            bookmarks,
            validated,
        })
    }
}

fn score_one(
    opportunity: Opportunity,
    config: &RankingConfig,
    personal: Option<&Personal>,
    trending: &HashMap<String, (usize, f64)>,
    now: &DateTime<Utc>,
) -> RankedOpportunity {
    let mut score_breakdown = BTreeMap::new();
    let mut base = 0.0;
    let weighted = std::iter::once((config.primary_criteria, config.primary_weight))
        .chain(config.secondary_criteria.iter().copied());
    for (criteria, weight) in weighted {
        let value = metric_value(&opportunity, criteria, now);
        score_breakdown.insert(criteria.to_string(), value);
        base += value * weight;
    }
    let base_score = base.clamp(0.0, 100.0);

    let personalization_score = personal
        .map(|p| {
            personalization_score(
                &opportunity,
                &p.prefs,
                p.bookmarks.contains(&opportunity.id),
                p.validated.contains(&opportunity.id),
            )
        })
        .unwrap_or(0.0);
    let freshness_score = freshness(
        age_days(&opportunity.created_at, now),
        age_days(&opportunity.updated_at, now),
    );
    let trending_score = trending
        .get(&opportunity.id)
        .map(|(count, sum)| trending_score(*count, *sum))
        .unwrap_or(0.0);

    let rank_score = (base_score * config.base_weight()
        + personalization_score * config.personalization_weight
        + freshness_score * config.freshness_weight
        + trending_score * config.trending_weight)
        .clamp(0.0, 100.0);

    RankedOpportunity {
        opportunity,
        rank_position: 0,
        rank_score,
        base_score,
        personalization_score,
        freshness_score,
        trending_score,
        score_breakdown,
    }
}

fn preferences_key(user_id: &str) -> String {
    format!("preferences:{user_id}")
}

#[derive(Serialize)]
struct RankingKey<'a> {
    filter: &'a FilterCriteria,
    config: &'a RankingConfig,
    preferences: Option<&'a UserPreferences>,
    page: usize,
    page_size: usize,
}

/// Digest of every ranking input. `None` if the inputs cannot be serialised.
fn cache_key(
    filter: &FilterCriteria,
    config: &RankingConfig,
    preferences: Option<&UserPreferences>,
    page: usize,
    page_size: usize,
) -> Option<String> {
    let bytes = serde_json::to_vec(&RankingKey {
        filter,
        config,
        preferences,
        page,
        page_size,
    })
    .ok()?;
    Some(format!("ranking:{}", hex::encode(Sha256::digest(&bytes))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::ai_solution_type::AiSolutionType;
    use crate::domain::values::industry::Industry;

    #[test]
    fn test_market_size_log_scale() {
        assert_eq!(market_size_score(50_000.0), 0.0);
        assert_eq!(market_size_score(1.0e5), 0.0);
        assert!((market_size_score(1.0e8) - 50.0).abs() < 1e-9);
        assert_eq!(market_size_score(1.0e12), 100.0);
    }

    #[test]
    fn test_metric_accessors() {
        let now = Utc::now();
        let mut o = Opportunity::new("t".into(), "d".into(), "s".into());
        o.validation_score = 7.0;
        o.ai_feasibility_score = 5.0;
        o.confidence_rating = 9.0;
        o.signal_engagement = 2500.0;
        o.competition_level = Some(Level::High);
        assert_eq!(metric_value(&o, RankingCriteria::ValidationScore, &now), 70.0);
        assert!((metric_value(&o, RankingCriteria::OverallScore, &now) - 70.0).abs() < 1e-9);
        assert_eq!(metric_value(&o, RankingCriteria::Engagement, &now), 100.0);
        assert_eq!(metric_value(&o, RankingCriteria::CompetitionLevel, &now), 10.0);
        assert_eq!(metric_value(&o, RankingCriteria::ImplementationComplexity, &now), 50.0);
        assert_eq!(metric_value(&o, RankingCriteria::MarketSize, &now), 0.0);
        assert!(metric_value(&o, RankingCriteria::CreatedAt, &now) > 99.0);
    }

    #[test]
    fn test_personalization_overlap_and_bonuses() {
        let mut o = Opportunity::new("t".into(), "d".into(), "s".into());
        o.ai_solution_types = vec![AiSolutionType::Automation, AiSolutionType::ComputerVision];
        o.target_industries = vec![Industry::Finance];
        o.implementation_complexity = Some(Level::Low);
        let prefs = UserPreferences {
            preferred_ai_types: vec![AiSolutionType::Automation],
            preferred_industries: vec![Industry::Finance],
            preferred_complexity: vec![Level::Low],
            ..UserPreferences::for_user("u1")
        };
        // (0.5·0.3 + 1·0.3 + 0.2)·100 = 65
        assert!((personalization_score(&o, &prefs, false, false) - 65.0).abs() < 1e-9);
        assert!((personalization_score(&o, &prefs, true, false) - 85.0).abs() < 1e-9);
        assert_eq!(personalization_score(&o, &prefs, true, true), 100.0);
        assert_eq!(
            personalization_score(&o, &UserPreferences::for_user("u2"), false, false),
            0.0
        );
    }

    #[test]
    fn test_trending_formula() {
        assert_eq!(trending_score(0, 0.0), 0.0);
        // 2·10 + 8·5
        assert_eq!(trending_score(2, 16.0), 60.0);
        assert_eq!(trending_score(9, 90.0), 100.0);
    }

    #[test]
    fn test_cache_key_depends_on_inputs() {
        let filter = FilterCriteria::default();
        let config = RankingConfig::default();
        let a = cache_key(&filter, &config, None, 1, 20).unwrap();
        let b = cache_key(&filter, &config, None, 2, 20).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, cache_key(&filter, &config, None, 1, 20).unwrap());
        assert!(a.starts_with("ranking:"));
    }
}
