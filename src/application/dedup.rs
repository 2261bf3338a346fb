//! Duplicate detection of candidates against recently persisted opportunities.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::application::candidates::OpportunityCandidate;
use crate::domain::entities::opportunity::Opportunity;
use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_repository::OpportunityRepository;
use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::text::{jaccard, normalize_text};

const TEXT_WEIGHT: f64 = 0.7;
const TYPE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub exact_match_threshold: f64,
    pub semantic_similarity_threshold: f64,
    pub partial_similarity_threshold: f64,
    /// Only opportunities created within this many days are compared.
    pub window_days: i64,
    /// At most this many of the most recent opportunities are compared.
    pub max_candidates: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            exact_match_threshold: 0.95,
            semantic_similarity_threshold: 0.80,
            partial_similarity_threshold: 0.65,
            window_days: 90,
            max_candidates: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityType {
    None,
    Exact,
    Semantic,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicationResult {
    pub is_duplicate: bool,
    pub similarity_score: f64,
    pub existing_opportunity_id: Option<String>,
    pub similarity_type: SimilarityType,
    pub confidence: f64,
    /// Similar enough to note, not similar enough to drop.
    pub partial_match: bool,
}

impl DuplicationResult {
    fn unique(best: f64, partial_of: Option<String>) -> Self {
        Self {
            is_duplicate: false,
            similarity_score: best,
            partial_match: partial_of.is_some(),
            existing_opportunity_id: partial_of,
            similarity_type: SimilarityType::None,
            confidence: (1.0 - best).clamp(0.0, 1.0),
        }
    }
}

pub struct DeduplicationEngine {
    config: DedupConfig,
    repo: Arc<dyn OpportunityRepository>,
}

impl DeduplicationEngine {
    pub fn new(config: DedupConfig, repo: Arc<dyn OpportunityRepository>) -> Self {
        Self { config, repo }
    }

    pub fn check_duplicate(&self, candidate: &OpportunityCandidate) -> Result<DuplicationResult, DomainError> {
        let since = Utc::now() - Duration::days(self.config.window_days);
        let existing = self.repo.recent_since(since, self.config.max_candidates)?;
        Ok(self.check_against(candidate, &existing))
    }

    /// Decide against an explicit set of existing opportunities.
    ///
    /// Exact normalized-title matches win over any semantic score.
    pub fn check_against(&self, candidate: &OpportunityCandidate, existing: &[Opportunity]) -> DuplicationResult {
        let title = normalize_text(&candidate.title);
        if let Some(hit) = existing.iter().find(|o| normalize_text(&o.title) == title) {
            return DuplicationResult {
                is_duplicate: true,
                similarity_score: 1.0,
                existing_opportunity_id: Some(hit.id.clone()),
                similarity_type: SimilarityType::Exact,
                confidence: 1.0,
                partial_match: false,
            };
        }

        let best = existing
            .iter()
            .map(|o| (o, semantic_similarity(candidate, o)))
            .fold(None::<(&Opportunity, f64)>, |best, (o, sim)| match best {
                Some((_, b)) if b >= sim => best,
                _ => Some((o, sim)),
            });

        let Some((opp, sim)) = best else {
            return DuplicationResult::unique(0.0, None);
        };

        let c = &self.config;
        if sim >= c.exact_match_threshold {
            Self::semantic(opp, sim, 0.9)
        } else if sim >= c.semantic_similarity_threshold {
            Self::semantic(opp, sim, 0.8)
        } else if sim >= c.partial_similarity_threshold {
            debug!(
                candidate_id = %candidate.candidate_id,
                existing_id = %opp.id,
                similarity = sim,
                "Partial match, keeping candidate"
            );
            DuplicationResult::unique(sim, Some(opp.id.clone()))
        } else {
            DuplicationResult::unique(sim, None)
        }
    }

    fn semantic(opp: &Opportunity, sim: f64, confidence: f64) -> DuplicationResult {
        DuplicationResult {
            is_duplicate: true,
            similarity_score: sim,
            existing_opportunity_id: Some(opp.id.clone()),
            similarity_type: SimilarityType::Semantic,
            confidence,
            partial_match: false,
        }
    }
}

fn tokens(text: &str) -> HashSet<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn type_overlap(a: &[AiSolutionType], b: &[AiSolutionType]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let a: HashSet<_> = a.iter().collect();
    let b: HashSet<_> = b.iter().collect();
    jaccard(&a, &b)
}

/// `0.7 · token overlap of title+description + 0.3 · AI-type overlap`.
pub fn semantic_similarity(candidate: &OpportunityCandidate, existing: &Opportunity) -> f64 {
    let text = jaccard(
        &tokens(&candidate.comparison_text()),
        &tokens(&existing.comparison_text()),
    );
    let types = type_overlap(&candidate.ai_solution_types, &existing.ai_solution_types);
    (TEXT_WEIGHT * text + TYPE_WEIGHT * types).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::opportunity_repo::SqliteOpportunityRepo;

    fn engine() -> DeduplicationEngine {
        let repo = Arc::new(SqliteOpportunityRepo::open(":memory:").unwrap());
        DeduplicationEngine::new(DedupConfig::default(), repo)
    }

    fn candidate(title: &str, description: &str, types: Vec<AiSolutionType>) -> OpportunityCandidate {
        OpportunityCandidate {
            candidate_id: "c1".into(),
            title: title.into(),
            description: description.into(),
            problem_statement: String::new(),
            proposed_solution: String::new(),
            ai_solution_types: types,
            target_industries: Vec::new(),
            tags: Vec::new(),
            market_signals: Vec::new(),
            confidence_score: 0.9,
            market_validation_score: 50.0,
            ai_feasibility_score: 50.0,
            total_engagement: 0.0,
            source_cluster_id: "cluster_x".into(),
        }
    }

    fn existing(title: &str, description: &str, types: Vec<AiSolutionType>) -> Opportunity {
        let mut o = Opportunity::new(title.into(), description.into(), String::new());
        o.ai_solution_types = types;
        o
    }

    #[test]
    fn test_exact_title_ignores_case_and_punctuation() {
        let c = candidate("AI Data Processing Solution", "one thing", vec![]);
        let e = existing("ai data-processing solution!", "something else entirely", vec![]);
        let r = engine().check_against(&c, &[e.clone()]);
        assert!(r.is_duplicate);
        assert_eq!(r.similarity_type, SimilarityType::Exact);
        assert_eq!(r.similarity_score, 1.0);
        assert_eq!(r.confidence, 1.0);
        assert_eq!(r.existing_opportunity_id, Some(e.id));
    }

    #[test]
    fn test_high_similarity_takes_top_tier() {
        let types = vec![AiSolutionType::Automation];
        let c = candidate("Invoice tool", "automate invoice entry for accountants", types.clone());
        let e = existing("Invoice tool.", "automate invoice entry for accountants", types);
        // Titles normalize equal, so exact wins first.
        assert_eq!(engine().check_against(&c, &[e]).similarity_type, SimilarityType::Exact);

        let c = candidate("Invoice tool alpha", "automate invoice entry for accountants", vec![AiSolutionType::Automation]);
        let e = existing("Invoice alpha tool", "automate invoice entry for accountants", vec![AiSolutionType::Automation]);
        let r = engine().check_against(&c, &[e]);
        assert!(r.similarity_score >= 0.95);
        assert_eq!(r.similarity_type, SimilarityType::Semantic);
        assert_eq!(r.confidence, 0.9);
    }

    #[test]
    fn test_semantic_tier() {
        // text overlap 8/10, no types on either side → 0.7·0.8 + 0.3 = 0.86
        let c = candidate("alpha beta gamma delta x", "epsilon zeta eta theta", vec![]);
        let e = existing("alpha beta gamma delta", "epsilon zeta eta theta iota", vec![]);
        let sim = semantic_similarity(&c, &e);
        assert!((sim - 0.86).abs() < 1e-9, "sim = {sim}");
        let r = engine().check_against(&c, &[e]);
        assert!(r.is_duplicate);
        assert_eq!(r.similarity_type, SimilarityType::Semantic);
        assert_eq!(r.confidence, 0.8);
    }

    #[test]
    fn test_partial_match_is_not_duplicate() {
        // text overlap 6/10 → 0.7·0.6 + 0.3 = 0.72
        let c = candidate("alpha beta gamma", "delta epsilon zeta one two", vec![]);
        let e = existing("alpha beta", "gamma delta epsilon zeta three four", vec![]);
        let r = engine().check_against(&c, &[e.clone()]);
        assert!(!r.is_duplicate);
        assert!(r.partial_match, "score {}", r.similarity_score);
        assert_eq!(r.similarity_type, SimilarityType::None);
        assert_eq!(r.existing_opportunity_id, Some(e.id));
    }

    #[test]
    fn test_type_mismatch_lowers_similarity() {
        let c = candidate("alpha beta gamma", "delta epsilon zeta one two", vec![AiSolutionType::ComputerVision]);
        let e = existing("alpha beta", "gamma delta epsilon zeta three four", vec![AiSolutionType::Automation]);
        let r = engine().check_against(&c, &[e]);
        assert!(!r.partial_match);
        assert!((r.similarity_score - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_no_existing_is_unique() {
        let c = candidate("Anything", "at all", vec![]);
        let r = engine().check_against(&c, &[]);
        assert!(!r.is_duplicate);
        assert_eq!(r.similarity_score, 0.0);
        assert_eq!(r.confidence, 1.0);
        assert!(engine().check_duplicate(&c).is_ok());
    }
}
