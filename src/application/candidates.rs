//! Template-based synthesis of draft opportunities from signal clusters.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::clustering::SignalCluster;
use crate::domain::error::DomainError;
use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::industry::Industry;
use crate::domain::values::keyword_rules::{classify, KeywordRules};

const MAX_AI_TYPES: usize = 3;
const MAX_INDUSTRIES: usize = 2;
const MAX_EXAMPLE_CHARS: usize = 160;

/// A draft opportunity that has not been deduplicated or persisted yet.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityCandidate {
    pub candidate_id: String,
    pub title: String,
    pub description: String,
    pub problem_statement: String,
    pub proposed_solution: String,
    pub ai_solution_types: Vec<AiSolutionType>,
    pub target_industries: Vec<Industry>,
    pub tags: Vec<String>,
    /// Ids of the signals in the source cluster.
    pub market_signals: Vec<String>,
    /// Cluster confidence, 0–1.
    pub confidence_score: f64,
    /// Cluster market potential, 0–100.
    pub market_validation_score: f64,
    /// Cluster AI opportunity score, 0–100.
    pub ai_feasibility_score: f64,
    pub total_engagement: f64,
    pub source_cluster_id: String,
}

impl OpportunityCandidate {
    pub fn comparison_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

pub struct CandidateGenerator {
    rules: Arc<KeywordRules>,
}

impl CandidateGenerator {
    pub fn new(rules: Arc<KeywordRules>) -> Self {
        Self { rules }
    }

    /// Build a candidate, logging and swallowing any failure.
    pub fn generate(&self, cluster: &SignalCluster) -> Option<OpportunityCandidate> {
        match self.try_generate(cluster) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!(cluster_id = %cluster.cluster_id, error = %e, "Candidate generation failed");
                None
            }
        }
    }

    pub fn try_generate(&self, cluster: &SignalCluster) -> Result<OpportunityCandidate, DomainError> {
        if cluster.signals.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "Cluster {} has no signals",
                cluster.cluster_id
            )));
        }

        let corpus = cluster
            .signals
            .iter()
            .map(|s| s.content_lower())
            .collect::<Vec<_>>()
            .join("\n");

        let ai_solution_types: Vec<AiSolutionType> =
            classify(&self.rules.ai_type_taxonomy, &corpus, MAX_AI_TYPES)
                .into_iter()
                .map(|(t, _)| t)
                .collect();
        let target_industries: Vec<Industry> =
            classify(&self.rules.industry_taxonomy, &corpus, MAX_INDUSTRIES)
                .into_iter()
                .map(|(i, _)| i)
                .collect();

        let themes = &cluster.dominant_themes;
        let theme_phrase = theme_phrase(themes);

        Ok(OpportunityCandidate {
            candidate_id: uuid::Uuid::new_v4().to_string(),
            title: title(themes),
            description: description(cluster, &theme_phrase),
            problem_statement: problem_statement(cluster, &theme_phrase),
            proposed_solution: proposed_solution(&ai_solution_types, &target_industries, &theme_phrase),
            tags: themes.clone(),
            market_signals: cluster.signal_ids(),
            confidence_score: cluster.confidence_level,
            market_validation_score: cluster.market_potential,
            ai_feasibility_score: cluster.ai_opportunity_score,
            total_engagement: cluster.total_engagement,
            ai_solution_types,
            target_industries,
            source_cluster_id: cluster.cluster_id.clone(),
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title(themes: &[String]) -> String {
    let t: Vec<String> = themes.iter().take(3).map(|t| capitalize(t)).collect();
    match t.as_slice() {
        [] => "AI Opportunity from Market Signals".to_string(),
        [a] => format!("AI-Powered {a} Solution"),
        [a, b] => format!("AI-Powered {a} {b} Solution"),
        [a, b, c, ..] => format!("AI-Powered {a} {b} Solution for {c}"),
    }
}

fn theme_phrase(themes: &[String]) -> String {
    match themes {
        [] => "the reported workflow".to_string(),
        [a] => a.clone(),
        [a, b] => format!("{a} and {b}"),
        [a, b, c, ..] => format!("{a}, {b} and {c}"),
    }
}

fn description(cluster: &SignalCluster, theme_phrase: &str) -> String {
    format!(
        "{} related market signals from {} source(s) point to unmet demand around {}. \
         Pain intensity {:.0}/100, market potential {:.0}/100, combined engagement {:.0}.",
        cluster.signal_count,
        cluster.unique_sources(),
        theme_phrase,
        cluster.pain_intensity,
        cluster.market_potential,
        cluster.total_engagement,
    )
}

fn problem_statement(cluster: &SignalCluster, theme_phrase: &str) -> String {
    let severity = if cluster.pain_intensity >= 60.0 {
        "critical, recurring problems"
    } else if cluster.pain_intensity >= 30.0 {
        "significant friction"
    } else {
        "ongoing friction"
    };
    let mut statement = format!("Users report {severity} with {theme_phrase}.");
    if let Some(example) = cluster
        .signals
        .iter()
        .map(|s| s.content.trim())
        .find(|c| !c.is_empty())
    {
        let excerpt: String = example.chars().take(MAX_EXAMPLE_CHARS).collect();
        let ellipsis = if example.chars().count() > MAX_EXAMPLE_CHARS { "..." } else { "" };
        statement.push_str(&format!(" Example: \"{excerpt}{ellipsis}\""));
    }
    statement
}

fn proposed_solution(types: &[AiSolutionType], industries: &[Industry], theme_phrase: &str) -> String {
    let approach = if types.is_empty() {
        "AI".to_string()
    } else {
        types.iter().map(|t| t.label()).collect::<Vec<_>>().join(" and ")
    };
    let audience = if industries.is_empty() {
        String::new()
    } else {
        format!(
            " for {} teams",
            industries.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" and ")
        )
    };
    format!("Build a {approach} product that addresses {theme_phrase}{audience}, reducing manual effort and surfacing insights automatically.")
}
