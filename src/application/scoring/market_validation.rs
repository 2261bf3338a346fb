//! Market validation scoring.
//!
//! Scores a set of signals along six independent dimensions and combines
//! them with configurable weights into one validation score.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::scoring::check_weights;
use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::error::DomainError;
use crate::domain::values::decay::{temporal_relevance, UNKNOWN_AGE_RELEVANCE};
use crate::domain::values::keyword_rules::KeywordRules;
use crate::domain::values::text::count_keywords;

/// Weights of the six validation dimensions. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWeights {
    pub signal_strength: f64,
    pub pain_intensity: f64,
    pub market_demand: f64,
    pub engagement_quality: f64,
    pub source_credibility: f64,
    pub temporal_relevance: f64,
}

impl Default for ValidationWeights {
    fn default() -> Self {
        Self {
            signal_strength: 0.25,
            pain_intensity: 0.20,
            market_demand: 0.20,
            engagement_quality: 0.15,
            source_credibility: 0.10,
            temporal_relevance: 0.10,
        }
    }
}

impl ValidationWeights {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_weights(
            "market validation",
            &[
                self.signal_strength,
                self.pain_intensity,
                self.market_demand,
                self.engagement_quality,
                self.source_credibility,
                self.temporal_relevance,
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketValidationScore {
    pub overall_score: f64,
    pub signal_strength: f64,
    pub pain_intensity: f64,
    pub market_demand: f64,
    pub engagement_quality: f64,
    pub source_credibility: f64,
    pub temporal_relevance: f64,
    pub confidence_level: f64,
    pub signal_count: usize,
}

pub struct MarketValidationScorer {
    weights: ValidationWeights,
    rules: Arc<KeywordRules>,
}

impl MarketValidationScorer {
    pub fn new(weights: ValidationWeights, rules: Arc<KeywordRules>) -> Result<Self, DomainError> {
        weights.validate()?;
        Ok(Self { weights, rules })
    }

    pub fn score(&self, signals: &[MarketSignal]) -> MarketValidationScore {
        self.score_at(signals, Utc::now())
    }

    /// Score as of `now`; signal ages are measured against it.
    pub fn score_at(&self, signals: &[MarketSignal], now: DateTime<Utc>) -> MarketValidationScore {
        if signals.is_empty() {
            return MarketValidationScore::default();
        }

        let signal_strength = signal_strength(signals);
        let pain_intensity = self.pain_intensity(signals);
        let market_demand = self.market_demand(signals);
        let engagement_quality = engagement_quality(signals);
        let source_credibility = self.source_credibility(signals);
        let temporal_relevance = mean_temporal_relevance(signals, &now);

        let w = &self.weights;
        let overall_score = (signal_strength * w.signal_strength
            + pain_intensity * w.pain_intensity
            + market_demand * w.market_demand
            + engagement_quality * w.engagement_quality
            + source_credibility * w.source_credibility
            + temporal_relevance * w.temporal_relevance)
            .clamp(0.0, 100.0);

        MarketValidationScore {
            overall_score,
            signal_strength,
            pain_intensity,
            market_demand,
            engagement_quality,
            source_credibility,
            temporal_relevance,
            confidence_level: confidence_level(signals),
            signal_count: signals.len(),
        }
    }

    /// Mean per-signal pain (capped at 100 each), scaled by the share of
    /// signals that use any pain language at all.
    fn pain_intensity(&self, signals: &[MarketSignal]) -> f64 {
        let n = signals.len() as f64;
        let mut total = 0.0;
        let mut with_pain = 0usize;
        for s in signals {
            let text = s.content_lower();
            if self.rules.has_pain_language(&text) {
                with_pain += 1;
            }
            let pain = self.rules.pain_hits(&text) * (1.0 + s.engagement() / 100.0);
            total += pain.min(100.0);
        }
        let coverage = with_pain as f64 / n;
        (total / n * coverage).clamp(0.0, 100.0)
    }

    fn market_demand(&self, signals: &[MarketSignal]) -> f64 {
        let total: f64 = signals
            .iter()
            .map(|s| {
                let hits = count_keywords(&s.content_lower(), &self.rules.demand_keywords) as f64;
                hits * s.signal_type.demand_multiplier() * (1.0 + s.engagement() / 50.0)
            })
            .sum();
        (total / signals.len() as f64 * 10.0).clamp(0.0, 100.0)
    }

    fn source_credibility(&self, signals: &[MarketSignal]) -> f64 {
        let total: f64 = signals
            .iter()
            .map(|s| {
                let adjusted =
                    self.rules.source_credibility(&s.source) * (0.5 + s.confidence_or_default());
                adjusted.min(1.0)
            })
            .sum();
        (total / signals.len() as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Volume (log-scaled) plus source and signal-type diversity bonuses.
fn signal_strength(signals: &[MarketSignal]) -> f64 {
    let n = signals.len() as f64;
    let volume = (10.0 * (n + 1.0).log10()).min(50.0);
    let sources: HashSet<String> = signals
        .iter()
        .map(|s| s.source.trim().to_lowercase())
        .collect();
    let types: HashSet<_> = signals.iter().map(|s| s.signal_type).collect();
    let source_bonus = (sources.len() as f64 * 5.0).min(25.0);
    let type_bonus = (types.len() as f64 * 8.0).min(25.0);
    (volume + source_bonus + type_bonus).clamp(0.0, 100.0)
}

/// Weighted interactions per 100 characters of content, averaged.
fn engagement_quality(signals: &[MarketSignal]) -> f64 {
    let total: f64 = signals
        .iter()
        .map(|s| {
            let length_factor = (s.content.chars().count() as f64 / 100.0).max(1.0);
            s.engagement_metrics.weighted() / length_factor
        })
        .sum();
    (total / signals.len() as f64).clamp(0.0, 100.0)
}

fn mean_temporal_relevance(signals: &[MarketSignal], now: &DateTime<Utc>) -> f64 {
    let total: f64 = signals
        .iter()
        .map(|s| match s.age_days(now) {
            Some(age) => temporal_relevance(age),
            None => UNKNOWN_AGE_RELEVANCE,
        })
        .sum();
    total / signals.len() as f64
}

fn confidence_level(signals: &[MarketSignal]) -> f64 {
    let n = signals.len() as f64;
    let count_factor = (n / 10.0).min(1.0);
    let mean_confidence = signals.iter().map(|s| s.confidence_or_default()).sum::<f64>() / n;
    let sources: HashSet<String> = signals
        .iter()
        .map(|s| s.source.trim().to_lowercase())
        .collect();
    let diversity = (sources.len() as f64 / 5.0).min(1.0);
    let engagement = (signals.iter().map(|s| s.engagement()).sum::<f64>() / 100.0).min(1.0);
    ((count_factor + mean_confidence + diversity + engagement) / 4.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::signal_type::SignalType;
    use chrono::Duration;

    fn scorer() -> MarketValidationScorer {
        MarketValidationScorer::new(ValidationWeights::default(), Arc::new(KeywordRules::default()))
            .unwrap()
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let score = scorer().score(&[]);
        assert_eq!(score, MarketValidationScore::default());
        assert_eq!(score.confidence_level, 0.0);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = ValidationWeights {
            signal_strength: 0.5,
            ..Default::default()
        };
        let err = MarketValidationScorer::new(weights, Arc::new(KeywordRules::default()));
        assert!(matches!(err, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_signal_strength_single_signal() {
        let s = vec![MarketSignal::new("x", SignalType::PainPoint, "github")];
        // 10·log10(2) + 5 + 8
        let expected = 10.0 * 2f64.log10() + 5.0 + 8.0;
        assert!((signal_strength(&s) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_age_is_neutral() {
        let s = vec![MarketSignal::new("x", SignalType::PainPoint, "github").with_extracted_at(None)];
        assert_eq!(mean_temporal_relevance(&s, &Utc::now()), 50.0);
    }

    #[test]
    fn test_demand_weighted_by_type() {
        let sc = scorer();
        let feature = vec![MarketSignal::new("we need this", SignalType::FeatureRequest, "github")];
        let chat = vec![MarketSignal::new("we need this", SignalType::Discussion, "github")];
        assert!((sc.market_demand(&feature) - 15.0).abs() < 1e-9);
        assert!((sc.market_demand(&chat) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pain_scaled_by_coverage() {
        let sc = scorer();
        let signals = vec![
            MarketSignal::new("this is critical", SignalType::PainPoint, "github"),
            MarketSignal::new("all fine here", SignalType::PainPoint, "github"),
        ];
        // mean(25, 0) · 0.5
        assert!((sc.pain_intensity(&signals) - 6.25).abs() < 1e-9);
    }

    #[test]
    fn test_credibility_capped_per_signal() {
        let sc = scorer();
        let s = vec![MarketSignal::new("x", SignalType::PainPoint, "github").with_confidence(1.0)];
        assert_eq!(sc.source_credibility(&s), 100.0);
        let s = vec![MarketSignal::new("x", SignalType::PainPoint, "unknown").with_confidence(0.5)];
        assert!((sc.source_credibility(&s) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_old_vague_signal_scores_low() {
        let now = Utc::now();
        let s = vec![MarketSignal::new("It would be nice to have dark mode", SignalType::Discussion, "twitter")
            .with_engagement(1.0, 0.0, 0.0)
            .with_extracted_at(Some(now - Duration::days(200)))];
        let score = scorer().score_at(&s, now);
        assert!(score.overall_score < 30.0, "got {}", score.overall_score);
    }
}
