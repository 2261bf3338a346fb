//! Competitive analysis.
//!
//! Mines a signal set for competitor mentions, saturation language, market
//! gaps and advantages, and classifies the resulting market position.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::values::industry::Industry;
use crate::domain::values::keyword_rules::{classify, KeywordRules};
use crate::domain::values::level::{Level, MarketPositioning};
use crate::domain::values::text::{contains_any, count_keyword, count_keywords, sentences, words};

const MIN_COMPETITOR_MENTIONS: usize = 2;
const MAX_COMPETITORS: usize = 10;
const MAX_CONTEXTS: usize = 3;
const MIN_ADVANTAGE_HITS: usize = 2;
const MIN_GAP_SENTENCES: usize = 2;
const MAX_GAPS: usize = 5;
const MAX_DIFFERENTIATORS: usize = 5;
const AI_MENTION_SHARE: f64 = 0.3;
const MIN_NETWORK_EFFECT_HITS: usize = 2;
const NEUTRAL_COMPETITION_SCORE: f64 = 50.0;
const AI_FIRST_DIFFERENTIATOR: &str = "AI-first approach as differentiator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorMention {
    pub name: String,
    pub mention_count: usize,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    pub competition_score: f64,
    pub competition_level: Level,
    pub market_positioning: MarketPositioning,
    pub competitors: Vec<CompetitorMention>,
    pub direct_competitor_mentions: usize,
    pub market_saturation: f64,
    pub domain_baseline: f64,
    pub competitive_advantages: Vec<String>,
    pub market_gaps: Vec<String>,
    pub differentiation_opportunities: Vec<String>,
    pub competitive_threats: Vec<String>,
    pub confidence_level: f64,
}

impl CompetitiveAnalysis {
    /// Result for an empty signal set. Unknown competition is not zero
    /// competition, so the score sits at the midpoint.
    pub fn neutral() -> Self {
        Self {
            competition_score: NEUTRAL_COMPETITION_SCORE,
            competition_level: Level::from_competition_score(NEUTRAL_COMPETITION_SCORE),
            market_positioning: classify_positioning(NEUTRAL_COMPETITION_SCORE, 0, 0),
            competitors: Vec::new(),
            direct_competitor_mentions: 0,
            market_saturation: 0.0,
            domain_baseline: 0.0,
            competitive_advantages: Vec::new(),
            market_gaps: Vec::new(),
            differentiation_opportunities: Vec::new(),
            competitive_threats: Vec::new(),
            confidence_level: 0.0,
        }
    }
}

/// blue ocean: score < 40 with ≥2 gaps and ≥2 advantages;
/// niche: score < 70 with ≥1 advantage; otherwise red ocean.
pub fn classify_positioning(score: f64, gaps: usize, advantages: usize) -> MarketPositioning {
    if score < 40.0 && gaps >= 2 && advantages >= 2 {
        MarketPositioning::BlueOcean
    } else if score < 70.0 && advantages >= 1 {
        MarketPositioning::Niche
    } else {
        MarketPositioning::RedOcean
    }
}

pub struct CompetitiveAnalysisEngine {
    rules: Arc<KeywordRules>,
}

impl CompetitiveAnalysisEngine {
    pub fn new(rules: Arc<KeywordRules>) -> Self {
        Self { rules }
    }

    pub fn analyze(&self, signals: &[MarketSignal]) -> CompetitiveAnalysis {
        if signals.is_empty() {
            return CompetitiveAnalysis::neutral();
        }

        let lowered: Vec<String> = signals.iter().map(|s| s.content_lower()).collect();
        let corpus = lowered.join("\n");

        let competitors = self.extract_competitors(signals);
        let direct_competitor_mentions: usize = competitors.iter().map(|c| c.mention_count).sum();
        let domain_baseline = self.domain_baseline(&corpus);
        let market_saturation = self.market_saturation(&corpus, domain_baseline);
        let competitive_advantages = self.competitive_advantages(&corpus);
        let market_gaps = self.market_gaps(signals);
        let differentiation_opportunities = self.differentiation_opportunities(signals, &lowered);
        let competitive_threats = self.competitive_threats(&corpus);

        let competition_score = ((competitors.len() as f64 * 8.0).min(40.0)
            + market_saturation * 0.3
            + (direct_competitor_mentions as f64 * 2.0).min(20.0)
            + domain_baseline.max(10.0))
        .clamp(0.0, 100.0);

        let confidence_level = confidence_level(signals, competitors.len());

        CompetitiveAnalysis {
            competition_level: Level::from_competition_score(competition_score),
            market_positioning: classify_positioning(
                competition_score,
                market_gaps.len(),
                competitive_advantages.len(),
            ),
            competition_score,
            competitors,
            direct_competitor_mentions,
            market_saturation,
            domain_baseline,
            competitive_advantages,
            market_gaps,
            differentiation_opportunities,
            competitive_threats,
            confidence_level,
        }
    }

    /// Words that directly follow a competitor phrase, kept when mentioned
    /// at least twice across the signal set.
    fn extract_competitors(&self, signals: &[MarketSignal]) -> Vec<CompetitorMention> {
        let phrases: Vec<Vec<String>> = self
            .rules
            .competitor_phrases
            .iter()
            .map(|p| p.split_whitespace().map(str::to_lowercase).collect())
            .filter(|p: &Vec<String>| !p.is_empty())
            .collect();

        // key → (display name, count, contexts, first-seen order)
        let mut found: HashMap<String, (String, usize, Vec<String>, usize)> = HashMap::new();
        let mut order = 0usize;

        for signal in signals {
            for sentence in sentences(&signal.content) {
                let tokens = words(sentence);
                let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
                for phrase in &phrases {
                    if phrase.len() >= lower.len() {
                        continue;
                    }
                    for start in 0..(lower.len() - phrase.len()) {
                        if lower[start..start + phrase.len()] != phrase[..] {
                            continue;
                        }
                        let candidate = tokens[start + phrase.len()];
                        let key = candidate.to_lowercase();
                        if key.chars().count() < 2
                            || self.rules.is_stop_word(&key)
                            || !key.chars().next().is_some_and(|c| c.is_alphabetic())
                        {
                            continue;
                        }
                        let slot = found.entry(key).or_insert_with(|| {
                            order += 1;
                            (candidate.to_string(), 0, Vec::new(), order)
                        });
                        slot.1 += 1;
                        if slot.2.len() < MAX_CONTEXTS && !slot.2.iter().any(|c| c == sentence) {
                            slot.2.push(sentence.to_string());
                        }
                    }
                }
            }
        }

        let mut competitors: Vec<(usize, CompetitorMention)> = found
            .into_values()
            .filter(|(_, count, _, _)| *count >= MIN_COMPETITOR_MENTIONS)
            .map(|(name, mention_count, contexts, order)| {
                (
                    order,
                    CompetitorMention {
                        name,
                        mention_count,
                        contexts,
                    },
                )
            })
            .collect();
        competitors.sort_by(|a, b| {
            b.1.mention_count
                .cmp(&a.1.mention_count)
                .then(a.0.cmp(&b.0))
        });
        competitors
            .into_iter()
            .take(MAX_COMPETITORS)
            .map(|(_, c)| c)
            .collect()
    }

    /// Mean competitiveness of the industries the signals talk about.
    fn domain_baseline(&self, corpus: &str) -> f64 {
        let industries: Vec<Industry> = classify(&self.rules.industry_taxonomy, corpus, usize::MAX)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        if industries.is_empty() {
            return self.rules.default_industry_competitiveness;
        }
        industries
            .iter()
            .map(|i| self.rules.competitiveness(*i))
            .sum::<f64>()
            / industries.len() as f64
    }

    /// Saturation-keyword density + industry baseline + existing-solution density.
    fn market_saturation(&self, corpus: &str, domain_baseline: f64) -> f64 {
        let chars = corpus.chars().count().max(1) as f64;
        let per_thousand = |hits: usize| hits as f64 * 1000.0 / chars;

        let saturation_hits = count_keywords(corpus, &self.rules.saturation_keywords);
        let existing_hits = count_keywords(corpus, &self.rules.existing_solution_keywords);

        let saturation_term = (per_thousand(saturation_hits) * 10.0).min(40.0);
        let baseline_term = domain_baseline.min(40.0);
        let existing_term = (per_thousand(existing_hits) * 5.0).min(20.0);
        (saturation_term + baseline_term + existing_term).clamp(0.0, 100.0)
    }

    fn competitive_advantages(&self, corpus: &str) -> Vec<String> {
        self.rules
            .advantage_families
            .iter()
            .filter(|f| count_keywords(corpus, &f.keywords) >= MIN_ADVANTAGE_HITS)
            .map(|f| f.template.clone())
            .collect()
    }

    /// Gap indicators backed by at least two distinct sentences, strongest first.
    fn market_gaps(&self, signals: &[MarketSignal]) -> Vec<String> {
        let mut support: Vec<(usize, &str, BTreeSet<String>)> = self
            .rules
            .gap_indicators
            .iter()
            .enumerate()
            .map(|(i, g)| (i, g.as_str(), BTreeSet::new()))
            .collect();

        for signal in signals {
            for sentence in sentences(&signal.content) {
                let lower = sentence.to_lowercase();
                for (_, indicator, set) in support.iter_mut() {
                    if count_keyword(&lower, indicator) > 0 {
                        set.insert(sentence.to_string());
                    }
                }
            }
        }

        support.retain(|(_, _, set)| set.len() >= MIN_GAP_SENTENCES);
        support.sort_by(|a, b| b.2.len().cmp(&a.2.len()).then(a.0.cmp(&b.0)));
        support
            .into_iter()
            .take(MAX_GAPS)
            .map(|(_, indicator, set)| {
                let example = set.iter().next().cloned().unwrap_or_default();
                format!("{indicator}: {example} ({} mentions)", set.len())
            })
            .collect()
    }

    fn differentiation_opportunities(&self, signals: &[MarketSignal], lowered: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for signal in signals.iter().filter(|s| s.signal_type.expresses_need()) {
            for sentence in sentences(&signal.content) {
                if out.len() >= MAX_DIFFERENTIATORS {
                    break;
                }
                let lower = sentence.to_lowercase();
                if contains_any(&lower, &self.rules.unmet_need_phrases) && seen.insert(lower) {
                    out.push(format!("Address unmet need: {sentence}"));
                }
            }
        }

        let ai_mentions = lowered
            .iter()
            .filter(|text| contains_any(text, &self.rules.ai_mention_keywords))
            .count();
        if ai_mentions as f64 / lowered.len() as f64 >= AI_MENTION_SHARE {
            out.push(AI_FIRST_DIFFERENTIATOR.to_string());
        }
        out
    }

    fn competitive_threats(&self, corpus: &str) -> Vec<String> {
        let mut threats: Vec<String> = self
            .rules
            .established_player_keywords
            .iter()
            .filter(|k| count_keyword(corpus, k) > 0)
            .map(|k| format!("Established player presence: {k}"))
            .collect();
        if count_keywords(corpus, &self.rules.network_effect_keywords) >= MIN_NETWORK_EFFECT_HITS {
            threats.push("Network effects and lock-in favour incumbents".to_string());
        }
        threats
    }
}

fn confidence_level(signals: &[MarketSignal], competitor_count: usize) -> f64 {
    let n = signals.len() as f64;
    let count_factor = (n / 8.0).min(1.0);
    let competitor_factor = if competitor_count == 0 {
        0.3
    } else {
        (competitor_count as f64 / 3.0).min(1.0)
    };
    let mean_confidence = signals.iter().map(|s| s.confidence_or_default()).sum::<f64>() / n;
    ((count_factor + competitor_factor + mean_confidence) / 3.0).clamp(0.0, 1.0)
}
