pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::discovery::{DiscoveryReport, OpportunityEngine};
use crate::application::ranking::{RankingResult, RankingSystem};
use crate::application::scoring::advanced::{
    AdvancedOpportunityScore, AdvancedScoringEngine, AgentAnalysis, OpportunityContext,
};
use crate::application::scoring::competitive::CompetitiveAnalysis;
use crate::application::scoring::market_validation::MarketValidationScore;
use crate::application::stats::StatsUseCase;
use crate::application::validation::ValidationUseCase;
use crate::config::AppConfig;
use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::validation::ValidationResult;
use crate::domain::error::DomainError;
use crate::domain::ports::cache::Cache;
use crate::domain::ports::opportunity_repository::{OpportunityRepository, OpportunityStats};
use crate::domain::values::opportunity_status::OpportunityStatus;
use crate::domain::values::ranking::{FilterCriteria, RankingConfig, UserPreferences};
use crate::infrastructure::cache::memory::MemoryCache;
use crate::infrastructure::cache::noop::NoopCache;
use crate::infrastructure::sqlite::opportunity_repo::SqliteOpportunityRepo;
use std::sync::Arc;
use tracing::info;

/// Discovery, scoring and ranking wired over one SQLite store.
pub struct AiScout {
    scoring: Arc<AdvancedScoringEngine>,
    engine: Arc<OpportunityEngine>,
    ranking: RankingSystem,
    ranking_config: RankingConfig,
    validation_uc: ValidationUseCase,
    stats_uc: StatsUseCase,
    repo: Arc<dyn OpportunityRepository>,
}

impl AiScout {
    /// In-process cache when ranking caching is on, otherwise a cache that stores nothing.
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let cache: Arc<dyn Cache> = if config.ranking.use_cache {
            Arc::new(MemoryCache::new())
        } else {
            Arc::new(NoopCache)
        };
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: &AppConfig, cache: Arc<dyn Cache>) -> Result<Self, DomainError> {
        let repo: Arc<dyn OpportunityRepository> = Arc::new(SqliteOpportunityRepo::open(&config.db_path)?);
        Self::with_parts(config, repo, cache)
    }

    /// Build over caller-supplied store and cache backends.
    pub fn with_parts(
        config: &AppConfig,
        repo: Arc<dyn OpportunityRepository>,
        cache: Arc<dyn Cache>,
    ) -> Result<Self, DomainError> {
        config.ranking.validate()?;
        let rules = Arc::new(config.rules()?);
        let scoring = Arc::new(AdvancedScoringEngine::new(
            config.advanced_weights.clone(),
            config.validation_weights.clone(),
            rules.clone(),
        )?);
        let engine = OpportunityEngine::new(
            config.engine.clone(),
            config.clustering.clone(),
            config.dedup.clone(),
            scoring.clone(),
            rules,
            repo.clone(),
        )?;

        info!(db = %config.db_path, "aiscout initialised");
        Ok(Self {
            scoring,
            engine: Arc::new(engine),
            ranking: RankingSystem::new(repo.clone(), cache, config.preferences_ttl_secs),
            ranking_config: config.ranking.clone(),
            validation_uc: ValidationUseCase::new(repo.clone()),
            stats_uc: StatsUseCase::new(repo.clone()),
            repo,
        })
    }

    pub fn discover(
        &self,
        signals: &[MarketSignal],
        batch_id: Option<String>,
    ) -> Result<DiscoveryReport, DomainError> {
        self.engine.process_signals_to_opportunities(signals, batch_id)
    }

    /// Run independent batches concurrently. Each batch is still processed
    /// sequentially; results come back in input order.
    pub async fn discover_batches(
        &self,
        batches: Vec<(Vec<MarketSignal>, Option<String>)>,
    ) -> Vec<Result<DiscoveryReport, DomainError>> {
        let handles: Vec<_> = batches
            .into_iter()
            .map(|(signals, batch_id)| {
                let engine = self.engine.clone();
                tokio::task::spawn_blocking(move || {
                    engine.process_signals_to_opportunities(&signals, batch_id)
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            reports.push(match handle.await {
                Ok(report) => report,
                Err(e) => Err(DomainError::Database(format!("Discovery task failed: {e}"))),
            });
        }
        reports
    }

    pub fn score(
        &self,
        signals: &[MarketSignal],
        context: Option<&OpportunityContext>,
        agent: Option<&AgentAnalysis>,
    ) -> AdvancedOpportunityScore {
        self.scoring.score(signals, context, agent)
    }

    pub fn validate_market(&self, signals: &[MarketSignal]) -> MarketValidationScore {
        self.scoring.validation().score(signals)
    }

    pub fn analyze_competition(&self, signals: &[MarketSignal]) -> CompetitiveAnalysis {
        self.scoring.competitive().analyze(signals)
    }

    /// Rank with the configured weights, personalised when `user_id` is set.
    pub fn rank(
        &self,
        filter: &FilterCriteria,
        user_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<RankingResult, DomainError> {
        let prefs = user_id.map(|u| self.ranking.user_preferences(u));
        self.ranking
            .rank(filter, &self.ranking_config, prefs.as_ref(), page, page_size)
    }

    pub fn rank_with(
        &self,
        filter: &FilterCriteria,
        config: &RankingConfig,
        preferences: Option<&UserPreferences>,
        page: usize,
        page_size: usize,
    ) -> Result<RankingResult, DomainError> {
        self.ranking.rank(filter, config, preferences, page, page_size)
    }

    pub fn trending(&self, limit: usize) -> Result<RankingResult, DomainError> {
        self.ranking.get_trending_opportunities(limit)
    }

    pub fn recommend(&self, user_id: &str, limit: usize) -> Result<RankingResult, DomainError> {
        self.ranking.get_personalized_recommendations(user_id, limit)
    }

    pub fn preferences(&self, user_id: &str) -> UserPreferences {
        self.ranking.user_preferences(user_id)
    }

    pub fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DomainError> {
        self.ranking.save_preferences(preferences)
    }

    pub fn validate(
        &self,
        opportunity_id: &str,
        user_id: &str,
        score: f64,
        notes: Option<String>,
    ) -> Result<ValidationResult, DomainError> {
        self.validation_uc.validate(opportunity_id, user_id, score, notes)
    }

    pub fn set_status(&self, opportunity_id: &str, status: OpportunityStatus) -> Result<Opportunity, DomainError> {
        self.validation_uc.set_status(opportunity_id, status)
    }

    pub fn bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        self.validation_uc.bookmark(user_id, opportunity_id)
    }

    pub fn unbookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        self.validation_uc.unbookmark(user_id, opportunity_id)
    }

    pub fn get_opportunity(&self, id: &str) -> Result<Option<Opportunity>, DomainError> {
        self.repo.get_by_id(id)
    }

    pub fn stats(&self) -> Result<OpportunityStats, DomainError> {
        self.stats_uc.stats()
    }
}
