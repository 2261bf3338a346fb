//! Advanced opportunity scoring.
//!
//! Combines market validation and competitive analysis with feasibility,
//! complexity and timing estimates into one overall score.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::scoring::check_weights;
use crate::application::scoring::competitive::{CompetitiveAnalysis, CompetitiveAnalysisEngine};
use crate::application::scoring::market_validation::{
    MarketValidationScore, MarketValidationScorer, ValidationWeights,
};
use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::error::DomainError;
use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::industry::Industry;
use crate::domain::values::keyword_rules::KeywordRules;
use crate::domain::values::level::Level;
use crate::domain::values::text::{count_keyword, count_keywords};

const BASE_COMPLEXITY: f64 = 50.0;
const BASE_TIMING: f64 = 50.0;
const RECENT_DAYS: f64 = 30.0;
const BASELINE_CONFIDENCE: f64 = 0.8;

/// Weights of the five overall-score components. Must sum to 1.0.
///
/// Competition and complexity enter the sum inverted (`100 − x`) since a
/// higher value is worse for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedWeights {
    pub market_validation: f64,
    pub competitive_analysis: f64,
    pub ai_feasibility: f64,
    pub implementation_complexity: f64,
    pub market_timing: f64,
}

impl Default for AdvancedWeights {
    fn default() -> Self {
        Self {
            market_validation: 0.35,
            competitive_analysis: 0.25,
            ai_feasibility: 0.20,
            implementation_complexity: 0.10,
            market_timing: 0.10,
        }
    }
}

impl AdvancedWeights {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_weights(
            "advanced scoring",
            &[
                self.market_validation,
                self.competitive_analysis,
                self.ai_feasibility,
                self.implementation_complexity,
                self.market_timing,
            ],
        )
    }
}

/// Optional description of the opportunity being scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityContext {
    pub ai_solution_types: Vec<AiSolutionType>,
    pub target_industries: Vec<Industry>,
    pub title: String,
    pub description: String,
}

/// Externally supplied estimates that replace the computed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentAnalysis {
    pub ai_feasibility_score: Option<f64>,
    pub implementation_complexity: Option<f64>,
    pub market_timing_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedOpportunityScore {
    pub overall_score: f64,
    pub market_validation: MarketValidationScore,
    pub competitive_analysis: CompetitiveAnalysis,
    pub ai_feasibility_score: f64,
    pub implementation_complexity_score: f64,
    pub implementation_complexity: Level,
    pub market_timing_score: f64,
    pub business_viability_score: f64,
    pub risk_assessment_score: f64,
    pub confidence_level: f64,
    /// Weighted contribution of each component to `overall_score`.
    pub score_breakdown: BTreeMap<String, f64>,
}

pub struct AdvancedScoringEngine {
    weights: AdvancedWeights,
    validation: MarketValidationScorer,
    competitive: CompetitiveAnalysisEngine,
    rules: Arc<KeywordRules>,
}

impl AdvancedScoringEngine {
    pub fn new(
        weights: AdvancedWeights,
        validation_weights: ValidationWeights,
        rules: Arc<KeywordRules>,
    ) -> Result<Self, DomainError> {
        weights.validate()?;
        Ok(Self {
            weights,
            validation: MarketValidationScorer::new(validation_weights, rules.clone())?,
            competitive: CompetitiveAnalysisEngine::new(rules.clone()),
            rules,
        })
    }

    pub fn validation(&self) -> &MarketValidationScorer {
        &self.validation
    }

    pub fn competitive(&self) -> &CompetitiveAnalysisEngine {
        &self.competitive
    }

    pub fn score(
        &self,
        signals: &[MarketSignal],
        context: Option<&OpportunityContext>,
        agent: Option<&AgentAnalysis>,
    ) -> AdvancedOpportunityScore {
        self.score_at(signals, context, agent, Utc::now())
    }

    pub fn score_at(
        &self,
        signals: &[MarketSignal],
        context: Option<&OpportunityContext>,
        agent: Option<&AgentAnalysis>,
        now: DateTime<Utc>,
    ) -> AdvancedOpportunityScore {
        let mv = self.validation.score_at(signals, now);
        let ca = self.competitive.analyze(signals);
        let types: &[AiSolutionType] = context.map(|c| c.ai_solution_types.as_slice()).unwrap_or(&[]);

        let ai_feasibility = agent
            .and_then(|a| a.ai_feasibility_score)
            .map(clamp_score)
            .unwrap_or_else(|| self.ai_feasibility(signals, types));
        let complexity = agent
            .and_then(|a| a.implementation_complexity)
            .map(clamp_score)
            .unwrap_or_else(|| self.implementation_complexity(signals, types));
        let timing = agent
            .and_then(|a| a.market_timing_score)
            .map(clamp_score)
            .unwrap_or_else(|| self.market_timing(signals, &now));

        let mut viability = mv.market_demand * 0.4
            + (100.0 - ca.competition_score) * 0.3
            + ai_feasibility * 0.2
            + mv.pain_intensity * 0.1;
        if ca.competitive_advantages.len() >= 2 {
            viability += 10.0;
        }
        if !ca.market_gaps.is_empty() {
            viability += 5.0;
        }

        let mut risk = ca.competition_score * 0.4
            + complexity * 0.3
            + (100.0 - timing) * 0.2
            + ca.market_saturation * 0.1;
        if ca.competitive_threats.len() >= 2 {
            risk += 10.0;
        }
        if ca.competitive_advantages.len() >= 2 {
            risk -= 15.0;
        }

        let w = &self.weights;
        let score_breakdown = BTreeMap::from([
            ("market_validation".to_string(), mv.overall_score * w.market_validation),
            (
                "competitive_analysis".to_string(),
                (100.0 - ca.competition_score) * w.competitive_analysis,
            ),
            ("ai_feasibility".to_string(), ai_feasibility * w.ai_feasibility),
            (
                "implementation_complexity".to_string(),
                (100.0 - complexity) * w.implementation_complexity,
            ),
            ("market_timing".to_string(), timing * w.market_timing),
        ]);
        let overall_score = clamp_score(score_breakdown.values().sum());
        let confidence_level =
            ((mv.confidence_level + ca.confidence_level + BASELINE_CONFIDENCE) / 3.0).clamp(0.0, 1.0);

        AdvancedOpportunityScore {
            overall_score,
            ai_feasibility_score: ai_feasibility,
            implementation_complexity_score: complexity,
            implementation_complexity: Level::from_complexity_score(complexity),
            market_timing_score: timing,
            business_viability_score: clamp_score(viability),
            risk_assessment_score: clamp_score(risk),
            confidence_level,
            score_breakdown,
            market_validation: mv,
            competitive_analysis: ca,
        }
    }

    /// Mean signal AI relevance, lifted by up to 20 for mature AI types.
    fn ai_feasibility(&self, signals: &[MarketSignal], types: &[AiSolutionType]) -> f64 {
        let relevance = if signals.is_empty() {
            0.0
        } else {
            signals.iter().map(|s| s.ai_relevance_score).sum::<f64>() / signals.len() as f64
        };
        let maturities: Vec<f64> = types.iter().filter_map(|t| self.rules.maturity(*t)).collect();
        let bonus = if maturities.is_empty() {
            0.0
        } else {
            maturities.iter().sum::<f64>() / maturities.len() as f64 * 20.0
        };
        clamp_score(relevance + bonus)
    }

    fn implementation_complexity(&self, signals: &[MarketSignal], types: &[AiSolutionType]) -> f64 {
        let known: Vec<f64> = types.iter().filter_map(|t| self.rules.complexity(*t)).collect();
        let base = if known.is_empty() {
            BASE_COMPLEXITY
        } else {
            known.iter().sum::<f64>() / known.len() as f64
        };
        let density = if signals.is_empty() {
            0.0
        } else {
            let hits: usize = signals
                .iter()
                .map(|s| count_keywords(&s.content_lower(), &self.rules.complexity_keywords))
                .sum();
            hits as f64 / signals.len() as f64
        };
        clamp_score(base + (density * 5.0).min(20.0))
    }

    /// 50, shifted by the mean urgency weight over all urgency hits, plus up
    /// to 20 for the share of signals younger than 30 days.
    fn market_timing(&self, signals: &[MarketSignal], now: &DateTime<Utc>) -> f64 {
        if signals.is_empty() {
            return BASE_TIMING;
        }
        let mut total_weight = 0.0;
        let mut hits = 0usize;
        for s in signals {
            let text = s.content_lower();
            for entry in &self.rules.urgency_keywords {
                let n = count_keyword(&text, &entry.keyword);
                hits += n;
                total_weight += entry.weight * n as f64;
            }
        }
        let urgency = if hits == 0 { 0.0 } else { total_weight / hits as f64 };
        let recent = signals
            .iter()
            .filter(|s| s.age_days(now).is_some_and(|age| age < RECENT_DAYS))
            .count();
        let recency_boost = recent as f64 / signals.len() as f64 * 20.0;
        clamp_score(BASE_TIMING + urgency + recency_boost)
    }
}

fn clamp_score(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::signal_type::SignalType;
    use chrono::Duration;

    fn engine() -> AdvancedScoringEngine {
        AdvancedScoringEngine::new(
            AdvancedWeights::default(),
            ValidationWeights::default(),
            Arc::new(KeywordRules::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_bad_weights_rejected() {
        let weights = AdvancedWeights {
            market_timing: 0.3,
            ..Default::default()
        };
        let result = AdvancedScoringEngine::new(
            weights,
            ValidationWeights::default(),
            Arc::new(KeywordRules::default()),
        );
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_agent_overrides_short_circuit() {
        let agent = AgentAnalysis {
            ai_feasibility_score: Some(91.0),
            implementation_complexity: Some(20.0),
            market_timing_score: Some(150.0),
        };
        let signals = vec![MarketSignal::new("x", SignalType::PainPoint, "github")];
        let score = engine().score(&signals, None, Some(&agent));
        assert_eq!(score.ai_feasibility_score, 91.0);
        assert_eq!(score.implementation_complexity_score, 20.0);
        assert_eq!(score.implementation_complexity, Level::Low);
        assert_eq!(score.market_timing_score, 100.0);
    }

    #[test]
    fn test_feasibility_uses_maturity_table() {
        let signals = vec![MarketSignal::new("x", SignalType::PainPoint, "github").with_ai_relevance(60.0)];
        let context = OpportunityContext {
            ai_solution_types: vec![AiSolutionType::MachineLearning],
            ..Default::default()
        };
        let e = engine();
        assert_eq!(e.ai_feasibility(&signals, &[]), 60.0);
        assert!((e.ai_feasibility(&signals, &context.ai_solution_types) - 78.0).abs() < 1e-9);
    }

    #[test]
    fn test_complexity_from_types_and_keywords() {
        let e = engine();
        let plain = vec![MarketSignal::new("x", SignalType::PainPoint, "github")];
        assert_eq!(e.implementation_complexity(&plain, &[]), 50.0);
        assert_eq!(
            e.implementation_complexity(&plain, &[AiSolutionType::Automation]),
            30.0
        );
        let heavy = vec![MarketSignal::new(
            "legacy compliance with hipaa and gdpr is complex",
            SignalType::PainPoint,
            "github",
        )];
        // 5 hits · 5, capped at 20.
        assert_eq!(e.implementation_complexity(&heavy, &[]), 70.0);
    }

    #[test]
    fn test_timing_urgency_and_recency() {
        let e = engine();
        let now = Utc::now();
        let urgent = vec![MarketSignal::new("we need this asap, it is urgent", SignalType::PainPoint, "github")
            .with_extracted_at(Some(now))];
        // 50 + mean(18, 20) + 20
        assert!((e.market_timing(&urgent, &now) - 89.0).abs() < 1e-9);

        let stale = vec![MarketSignal::new("maybe someday", SignalType::Discussion, "github")
            .with_extracted_at(Some(now - Duration::days(60)))];
        assert!((e.market_timing(&stale, &now) - 45.0).abs() < 1e-9);

        let undated = vec![MarketSignal::new("plain", SignalType::Discussion, "github").with_extracted_at(None)];
        assert_eq!(e.market_timing(&undated, &now), 50.0);
    }

    #[test]
    fn test_breakdown_sums_to_overall() {
        let signals = vec![
            MarketSignal::new("Invoice entry is a tedious manual problem", SignalType::PainPoint, "reddit")
                .with_engagement(40.0, 10.0, 2.0),
            MarketSignal::new("We need to automate invoice entry", SignalType::FeatureRequest, "github")
                .with_engagement(25.0, 5.0, 0.0),
        ];
        let score = engine().score(&signals, None, None);
        let sum: f64 = score.score_breakdown.values().sum();
        assert!((sum - score.overall_score).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&score.confidence_level));
        for v in [
            score.overall_score,
            score.business_viability_score,
            score.risk_assessment_score,
            score.market_timing_score,
        ] {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_empty_signals_still_defined() {
        let score = engine().score(&[], None, None);
        assert_eq!(score.market_validation.overall_score, 0.0);
        assert_eq!(score.competitive_analysis.competition_score, 50.0);
        assert!((score.confidence_level - 0.8 / 3.0).abs() < 1e-9);
    }
}
