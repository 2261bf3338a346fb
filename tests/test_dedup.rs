mod common;

use aiscout::application::candidates::{CandidateGenerator, OpportunityCandidate};
use aiscout::application::clustering::{ClusteringConfig, SignalClusterer};
use aiscout::application::dedup::{DedupConfig, DeduplicationEngine, SimilarityType};
use aiscout::domain::ports::opportunity_repository::OpportunityRepository;
use aiscout::domain::values::ai_solution_type::AiSolutionType;
use aiscout::domain::values::keyword_rules::KeywordRules;
use aiscout::infrastructure::sqlite::opportunity_repo::SqliteOpportunityRepo;
use chrono::{Duration, Utc};
use common::{invoice_signals, opportunity, setup};
use std::sync::Arc;

fn candidate(title: &str, description: &str) -> OpportunityCandidate {
    OpportunityCandidate {
        candidate_id: "cand-1".into(),
        title: title.into(),
        description: description.into(),
        problem_statement: String::new(),
        proposed_solution: String::new(),
        ai_solution_types: vec![AiSolutionType::Automation],
        target_industries: Vec::new(),
        tags: Vec::new(),
        market_signals: Vec::new(),
        confidence_score: 0.8,
        market_validation_score: 50.0,
        ai_feasibility_score: 50.0,
        total_engagement: 0.0,
        source_cluster_id: "cluster_x".into(),
    }
}

fn engine() -> (DeduplicationEngine, Arc<SqliteOpportunityRepo>) {
    let repo = Arc::new(SqliteOpportunityRepo::open(":memory:").unwrap());
    (DeduplicationEngine::new(DedupConfig::default(), repo.clone()), repo)
}

#[test]
fn test_identical_title_is_exact_duplicate() {
    let (dedup, repo) = engine();
    let existing = opportunity("AI Data Processing Solution", 5.0, 5.0);
    repo.insert(&existing).unwrap();

    let verdict = dedup
        .check_duplicate(&candidate("ai data-processing solution!", "something else entirely"))
        .unwrap();
    assert!(verdict.is_duplicate);
    assert_eq!(verdict.similarity_type, SimilarityType::Exact);
    assert_eq!(verdict.similarity_score, 1.0);
    assert_eq!(verdict.existing_opportunity_id, Some(existing.id));
}

#[test]
fn test_exact_match_wins_regardless_of_description() {
    let (dedup, _repo) = engine();
    let mut first = opportunity("Smart Invoice Matching", 5.0, 5.0);
    first.description = "completely unrelated words".into();
    let verdict = dedup.check_against(&candidate("Smart Invoice Matching", "reconcile invoices"), &[first]);
    assert!(verdict.is_duplicate);
    assert_eq!(verdict.similarity_type, SimilarityType::Exact);
}

#[test]
fn test_similarity_tiers_map_to_confidence() {
    let (dedup, _repo) = engine();
    let description = "match incoming supplier invoices to bank payments for small finance teams every month";
    let mut existing = opportunity("Automated invoice matching", 5.0, 5.0);
    existing.description = description.into();
    existing.ai_solution_types = vec![AiSolutionType::Automation];

    // 16 of 17 tokens shared, same AI types
    let near = dedup.check_against(
        &candidate("Automated invoice matching tool", description),
        std::slice::from_ref(&existing),
    );
    assert!(near.is_duplicate);
    assert_eq!(near.similarity_type, SimilarityType::Semantic);
    assert!(near.similarity_score >= 0.95);
    assert_eq!(near.confidence, 0.9);

    // 9 of 11 tokens shared
    let mut short = opportunity("Automated invoice matching for finance teams", 5.0, 5.0);
    short.description = "match invoices to payments".into();
    short.ai_solution_types = vec![AiSolutionType::Automation];
    let close = dedup.check_against(
        &candidate("Automated invoice matching for finance team", "match invoices to payments"),
        &[short],
    );
    assert!(close.is_duplicate);
    assert_eq!(close.similarity_type, SimilarityType::Semantic);
    assert!(close.similarity_score >= 0.80 && close.similarity_score < 0.95);
    assert_eq!(close.confidence, 0.8);
}

#[test]
fn test_unrelated_candidate_is_unique() {
    let (dedup, repo) = engine();
    repo.insert(&opportunity("Shelf Camera Audit", 5.0, 5.0)).unwrap();
    let verdict = dedup
        .check_duplicate(&candidate("Voice Notes For Clinicians", "dictation"))
        .unwrap();
    assert!(!verdict.is_duplicate);
    assert!(!verdict.partial_match);
    assert_eq!(verdict.similarity_type, SimilarityType::None);
    assert!(verdict.existing_opportunity_id.is_none());
}

#[test]
fn test_opportunities_outside_window_are_ignored() {
    let (dedup, repo) = engine();
    let mut old = opportunity("AI Data Processing Solution", 5.0, 5.0);
    old.created_at = Utc::now() - Duration::days(120);
    old.updated_at = old.created_at;
    repo.insert(&old).unwrap();

    let verdict = dedup
        .check_duplicate(&candidate("AI Data Processing Solution", ""))
        .unwrap();
    assert!(!verdict.is_duplicate);
}

#[test]
fn test_retitled_candidate_matches_its_own_stored_form() {
    let scout = setup();
    let signals = invoice_signals("a");
    let report = scout.discover(&signals, None).unwrap();
    let stored = scout.get_opportunity(&report.opportunities[0].id).unwrap().unwrap();

    let rules = Arc::new(KeywordRules::default());
    let clusters = SignalClusterer::new(ClusteringConfig::default(), rules.clone())
        .unwrap()
        .cluster(&signals)
        .unwrap();
    let mut regenerated = CandidateGenerator::new(rules).generate(&clusters[0]).unwrap();
    assert_eq!(stored.description, regenerated.description);
    assert_eq!(stored.proposed_solution, regenerated.proposed_solution);
    regenerated.title.push_str(" Platform");

    let (dedup, _repo) = engine();
    let verdict = dedup.check_against(&regenerated, std::slice::from_ref(&stored));
    assert!(verdict.is_duplicate, "similarity {}", verdict.similarity_score);
    assert_eq!(verdict.similarity_type, SimilarityType::Semantic);
    assert!(verdict.similarity_score >= 0.95);
    assert_eq!(verdict.existing_opportunity_id, Some(stored.id));
}
