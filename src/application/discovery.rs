//! Opportunity discovery: signals → clusters → candidates → dedup → persist.
//!
//! A batch is processed strictly in order. Candidates are deduplicated and
//! inserted one at a time, so a later candidate in the same batch is checked
//! against the ones already persisted.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::application::candidates::{CandidateGenerator, OpportunityCandidate};
use crate::application::clustering::{ClusteringConfig, SignalCluster, SignalClusterer};
use crate::application::dedup::{DedupConfig, DeduplicationEngine};
use crate::application::scoring::advanced::{AdvancedScoringEngine, OpportunityContext};
use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::entities::opportunity::{to_storage_scale, Opportunity};
use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_repository::OpportunityRepository;
use crate::domain::values::keyword_rules::KeywordRules;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_signals_for_opportunity: usize,
    /// Minimum cluster confidence (0–1) for a candidate to be kept.
    pub confidence_threshold: f64,
    pub max_opportunities_per_batch: usize,
    /// Store competition level, complexity and overall score on new rows.
    pub enrich_with_advanced_scoring: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_signals_for_opportunity: 3,
            confidence_threshold: 0.7,
            max_opportunities_per_batch: 10,
            enrich_with_advanced_scoring: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DomainError::Config(format!(
                "Confidence threshold must be within 0–1, got {}",
                self.confidence_threshold
            )));
        }
        if self.min_signals_for_opportunity < 2 {
            return Err(DomainError::Config(
                "Opportunities need at least 2 signals per cluster".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    /// No cluster reached the minimum signal count.
    InsufficientSignals,
    /// Clusters qualified but none produced a confident candidate.
    NoCandidates,
}

/// Outcome of one discovery batch, including expected attrition.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub batch_id: String,
    pub status: BatchStatus,
    pub signals_received: usize,
    pub clusters_found: usize,
    pub clusters_insufficient: usize,
    pub candidates_generated: usize,
    pub candidates_low_confidence: usize,
    pub duplicates_skipped: usize,
    pub partial_matches: usize,
    pub generation_failures: usize,
    pub persist_failures: usize,
    pub opportunities: Vec<Opportunity>,
}

impl DiscoveryReport {
    fn new(batch_id: String, signals_received: usize) -> Self {
        Self {
            batch_id,
            status: BatchStatus::Completed,
            signals_received,
            clusters_found: 0,
            clusters_insufficient: 0,
            candidates_generated: 0,
            candidates_low_confidence: 0,
            duplicates_skipped: 0,
            partial_matches: 0,
            generation_failures: 0,
            persist_failures: 0,
            opportunities: Vec::new(),
        }
    }
}

pub struct OpportunityEngine {
    config: EngineConfig,
    clusterer: SignalClusterer,
    generator: CandidateGenerator,
    dedup: DeduplicationEngine,
    scoring: Arc<AdvancedScoringEngine>,
    repo: Arc<dyn OpportunityRepository>,
}

impl OpportunityEngine {
    pub fn new(
        config: EngineConfig,
        clustering: ClusteringConfig,
        dedup: DedupConfig,
        scoring: Arc<AdvancedScoringEngine>,
        rules: Arc<KeywordRules>,
        repo: Arc<dyn OpportunityRepository>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            config,
            clusterer: SignalClusterer::new(clustering, rules.clone())?,
            generator: CandidateGenerator::new(rules),
            dedup: DeduplicationEngine::new(dedup, repo.clone()),
            scoring,
            repo,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one batch. Only a clustering failure aborts the batch; failures
    /// on individual candidates are logged and counted.
    pub fn process_signals_to_opportunities(
        &self,
        signals: &[MarketSignal],
        batch_id: Option<String>,
    ) -> Result<DiscoveryReport, DomainError> {
        let batch_id = batch_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut report = DiscoveryReport::new(batch_id.clone(), signals.len());

        if signals.len() < self.config.min_signals_for_opportunity {
            info!(
                batch_id = %batch_id,
                signals = signals.len(),
                required = self.config.min_signals_for_opportunity,
                "Not enough signals for discovery"
            );
            report.status = BatchStatus::InsufficientSignals;
            return Ok(report);
        }

        let clusters = self.clusterer.cluster(signals).map_err(|e| {
            error!(batch_id = %batch_id, error = %e, "Clustering failed, aborting batch");
            e
        })?;
        report.clusters_found = clusters.len();

        let mut candidates: Vec<(OpportunityCandidate, &SignalCluster)> = Vec::new();
        for cluster in &clusters {
            if cluster.signal_count < self.config.min_signals_for_opportunity {
                debug!(
                    batch_id = %batch_id,
                    cluster_id = %cluster.cluster_id,
                    signals = cluster.signal_count,
                    "Cluster too small"
                );
                report.clusters_insufficient += 1;
                continue;
            }
            let Some(candidate) = self.generator.generate(cluster) else {
                report.generation_failures += 1;
                continue;
            };
            report.candidates_generated += 1;
            if candidate.confidence_score < self.config.confidence_threshold {
                debug!(
                    batch_id = %batch_id,
                    cluster_id = %cluster.cluster_id,
                    confidence = candidate.confidence_score,
                    "Candidate below confidence threshold"
                );
                report.candidates_low_confidence += 1;
                continue;
            }
            candidates.push((candidate, cluster));
        }

        if report.clusters_found == report.clusters_insufficient {
            report.status = BatchStatus::InsufficientSignals;
        } else if candidates.is_empty() {
            report.status = BatchStatus::NoCandidates;
        }

        for (candidate, cluster) in candidates {
            if report.opportunities.len() >= self.config.max_opportunities_per_batch {
                debug!(batch_id = %batch_id, candidate_id = %candidate.candidate_id, "Batch limit reached");
                break;
            }

            let verdict = match self.dedup.check_duplicate(&candidate) {
                Ok(v) => v,
                Err(e) => {
                    warn!(batch_id = %batch_id, candidate_id = %candidate.candidate_id, error = %e, "Duplicate check failed");
                    report.persist_failures += 1;
                    continue;
                }
            };
            if verdict.is_duplicate {
                debug!(
                    batch_id = %batch_id,
                    candidate_id = %candidate.candidate_id,
                    existing_id = ?verdict.existing_opportunity_id,
                    similarity = verdict.similarity_score,
                    "Skipping duplicate candidate"
                );
                report.duplicates_skipped += 1;
                continue;
            }
            if verdict.partial_match {
                report.partial_matches += 1;
            }

            let opportunity = self.to_opportunity(&candidate, cluster);
            match self.repo.insert(&opportunity) {
                Ok(()) => {
                    debug!(batch_id = %batch_id, opportunity_id = %opportunity.id, title = %opportunity.title, "Opportunity persisted");
                    report.opportunities.push(opportunity);
                }
                Err(e) => {
                    error!(batch_id = %batch_id, candidate_id = %candidate.candidate_id, error = %e, "Failed to persist opportunity");
                    report.persist_failures += 1;
                }
            }
        }

        info!(
            batch_id = %batch_id,
            status = ?report.status,
            signals = report.signals_received,
            clusters = report.clusters_found,
            created = report.opportunities.len(),
            duplicates = report.duplicates_skipped,
            "Discovery batch finished"
        );
        Ok(report)
    }

    fn to_opportunity(&self, candidate: &OpportunityCandidate, cluster: &SignalCluster) -> Opportunity {
        let mut o = Opportunity::new(
            candidate.title.clone(),
            candidate.description.clone(),
            candidate.problem_statement.clone(),
        );
        o.proposed_solution = candidate.proposed_solution.clone();
        o.ai_solution_types = candidate.ai_solution_types.clone();
        o.target_industries = candidate.target_industries.clone();
        o.tags = candidate.tags.clone();
        o.market_signals = candidate.market_signals.clone();
        o.validation_score = to_storage_scale(candidate.market_validation_score);
        o.ai_feasibility_score = to_storage_scale(candidate.ai_feasibility_score);
        o.confidence_rating = (candidate.confidence_score * 10.0).clamp(0.0, 10.0);
        o.signal_engagement = candidate.total_engagement;

        if self.config.enrich_with_advanced_scoring {
            let context = OpportunityContext {
                ai_solution_types: candidate.ai_solution_types.clone(),
                target_industries: candidate.target_industries.clone(),
                title: candidate.title.clone(),
                description: candidate.description.clone(),
            };
            let score = self.scoring.score(&cluster.signals, Some(&context), None);
            o.overall_score = Some(to_storage_scale(score.overall_score));
            o.competition_level = Some(score.competitive_analysis.competition_level);
            o.market_positioning = Some(score.competitive_analysis.market_positioning);
            o.implementation_complexity = Some(score.implementation_complexity);
        }
        o
    }
}
