//! Keyword heuristics driving clustering metrics, scoring and candidate
//! synthesis.
//!
//! The built-in table is returned by [`KeywordRules::default`]. Deployments
//! can tune it without touching code by pointing `AISCOUT_RULES` at a JSON
//! file; any key missing from that file keeps its built-in value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::industry::Industry;
use crate::domain::values::text::count_keyword;

/// One severity tier of pain language with its per-hit weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainTier {
    pub name: String,
    pub weight: f64,
    pub keywords: Vec<String>,
}

/// A family of phrases that, when repeated, indicates a competitive advantage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvantageFamily {
    pub name: String,
    pub keywords: Vec<String>,
    /// Sentence reported when the family qualifies.
    pub template: String,
}

/// Keyword with a signed adjustment, used by the urgency table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: f64,
}

/// Keyword list that classifies text into one taxonomy category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyEntry<T> {
    pub category: T,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRules {
    /// Words never treated as cluster themes.
    pub stop_words: Vec<String>,
    pub pain_tiers: Vec<PainTier>,
    pub demand_keywords: Vec<String>,
    pub saturation_keywords: Vec<String>,
    pub existing_solution_keywords: Vec<String>,
    /// Phrases after which the next word is read as a competitor name.
    pub competitor_phrases: Vec<String>,
    pub advantage_families: Vec<AdvantageFamily>,
    pub gap_indicators: Vec<String>,
    pub unmet_need_phrases: Vec<String>,
    pub ai_mention_keywords: Vec<String>,
    pub established_player_keywords: Vec<String>,
    pub network_effect_keywords: Vec<String>,
    pub urgency_keywords: Vec<WeightedKeyword>,
    pub complexity_keywords: Vec<String>,
    pub ai_type_taxonomy: Vec<TaxonomyEntry<AiSolutionType>>,
    pub industry_taxonomy: Vec<TaxonomyEntry<Industry>>,
    /// Technology maturity per AI type, 0–1.
    pub ai_type_maturity: BTreeMap<AiSolutionType, f64>,
    /// Baseline implementation complexity per AI type, 0–100.
    pub ai_type_complexity: BTreeMap<AiSolutionType, f64>,
    /// Competitiveness baseline per industry, 0–40.
    pub industry_competitiveness: BTreeMap<Industry, f64>,
    pub default_industry_competitiveness: f64,
    /// Credibility per source name, 0–1.
    pub source_credibility: BTreeMap<String, f64>,
    pub unknown_source_credibility: f64,
    /// Sources that count toward cluster confidence.
    pub credible_sources: Vec<String>,
}

fn kw(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn tier(name: &str, weight: f64, words: &[&str]) -> PainTier {
    PainTier {
        name: name.to_string(),
        weight,
        keywords: kw(words),
    }
}

fn family(name: &str, words: &[&str], template: &str) -> AdvantageFamily {
    AdvantageFamily {
        name: name.to_string(),
        keywords: kw(words),
        template: template.to_string(),
    }
}

fn urgency(keyword: &str, weight: f64) -> WeightedKeyword {
    WeightedKeyword {
        keyword: keyword.to_string(),
        weight,
    }
}

fn entry<T>(category: T, words: &[&str]) -> TaxonomyEntry<T> {
    TaxonomyEntry {
        category,
        keywords: kw(words),
    }
}

impl Default for KeywordRules {
    fn default() -> Self {
        use AiSolutionType as A;

        Self {
            stop_words: kw(&[
                "about", "after", "again", "also", "been", "before", "being", "both", "could",
                "does", "doing", "each", "even", "every", "from", "have", "having", "here", "into",
                "just", "like", "more", "most", "much", "only", "other", "over", "really", "same",
                "should", "some", "such", "than", "that", "their", "them", "then", "there",
                "these", "they", "this", "those", "very", "want", "were", "what", "when", "where",
                "which", "while", "will", "with", "would", "your", "need", "needs",
            ]),
            pain_tiers: vec![
                tier(
                    "critical",
                    25.0,
                    &[
                        "critical", "urgent", "blocking", "blocker", "broken", "crash", "crashes",
                        "emergency", "severe", "showstopper", "unusable", "data loss",
                    ],
                ),
                tier(
                    "high",
                    15.0,
                    &[
                        "frustrated", "frustrating", "painful", "terrible", "nightmare", "hate",
                        "struggle", "struggling", "waste of time", "impossible", "awful",
                    ],
                ),
                tier(
                    "medium",
                    8.0,
                    &[
                        "problem", "issue", "issues", "slow", "difficult", "annoying", "confusing",
                        "tedious", "manual", "inefficient", "time-consuming",
                    ],
                ),
                tier(
                    "low",
                    3.0,
                    &[
                        "would be nice", "could be better", "minor", "inconvenient", "nice to have",
                        "wish",
                    ],
                ),
            ],
            demand_keywords: kw(&[
                "need", "needs", "want", "wants", "demand", "looking for", "require", "requires",
                "would pay", "willing to pay", "must have", "request", "requested", "searching for",
            ]),
            saturation_keywords: kw(&[
                "saturated", "saturation", "crowded", "crowded market", "many competitors",
                "too many", "lots of options", "plenty of", "dominated by", "red ocean",
                "commoditized", "oversaturated",
            ]),
            existing_solution_keywords: kw(&[
                "existing solution", "existing solutions", "existing tools", "already exists",
                "current tools", "currently use", "we use", "off-the-shelf", "established",
                "market leader",
            ]),
            competitor_phrases: kw(&[
                "vs", "versus", "competitor", "competitors", "competing with", "alternative to",
                "alternatives to", "instead of", "compared to", "switched from", "better than",
                "replacement for",
            ]),
            advantage_families: vec![
                family(
                    "ai_native",
                    &[
                        "ai-powered", "ai powered", "ai-driven", "ai-native", "machine learning",
                        "intelligent", "automated",
                    ],
                    "AI-native approach can outperform incumbents built on manual workflows",
                ),
                family(
                    "user_experience",
                    &[
                        "easy to use", "user-friendly", "user friendly", "intuitive", "seamless",
                        "simple", "clean interface",
                    ],
                    "Superior user experience addresses usability complaints about current tools",
                ),
                family(
                    "performance",
                    &["faster", "real-time", "realtime", "scalable", "efficient", "low latency"],
                    "Performance and scalability improvements over existing solutions",
                ),
                family(
                    "cost",
                    &[
                        "cost-effective", "cost effective", "cheaper", "affordable", "save money",
                        "low cost", "low-cost", "inexpensive",
                    ],
                    "Cost-effective pricing opens the market to budget-constrained users",
                ),
                family(
                    "innovation",
                    &["innovative", "novel", "breakthrough", "new approach", "first of its kind"],
                    "Novel approach differentiates from established offerings",
                ),
                family(
                    "integration",
                    &[
                        "integrates", "integration", "integrations", "plugin", "works with",
                        "compatible with", "api",
                    ],
                    "Deep integration with existing workflows lowers switching costs",
                ),
            ],
            gap_indicators: kw(&[
                "no solution", "no tool", "no good", "nothing exists", "gap in the market",
                "gap in market", "market gap", "doesn't exist", "does not exist", "lack of",
                "underserved", "no one offers", "nobody offers", "unmet",
            ]),
            unmet_need_phrases: kw(&[
                "wish", "need", "needs", "missing", "if only", "would love", "lacking", "can't find",
            ]),
            ai_mention_keywords: kw(&[
                "ai", "artificial intelligence", "machine learning", "ml", "llm", "gpt",
                "ai-powered", "neural", "deep learning",
            ]),
            established_player_keywords: kw(&[
                "google", "microsoft", "amazon", "salesforce", "oracle", "ibm", "adobe",
                "big tech", "incumbent", "incumbents", "market leader", "established player",
            ]),
            network_effect_keywords: kw(&[
                "network effect", "network effects", "ecosystem", "lock-in", "locked in",
                "switching cost", "switching costs", "platform effect",
            ]),
            urgency_keywords: vec![
                urgency("urgent", 20.0),
                urgency("asap", 18.0),
                urgency("immediately", 15.0),
                urgency("critical", 15.0),
                urgency("growing", 10.0),
                urgency("trending", 10.0),
                urgency("emerging", 8.0),
                urgency("soon", 5.0),
                urgency("someday", -5.0),
                urgency("later", -5.0),
                urgency("not a priority", -10.0),
                urgency("eventually", -10.0),
            ],
            complexity_keywords: kw(&[
                "complex", "complicated", "legacy", "regulation", "regulated", "compliance",
                "hipaa", "gdpr", "security", "privacy", "real-time", "at scale", "migration",
            ]),
            ai_type_taxonomy: vec![
                entry(
                    A::MachineLearning,
                    &["machine learning", "ml", "model", "training", "classification", "prediction model"],
                ),
                entry(
                    A::NaturalLanguageProcessing,
                    &[
                        "nlp", "text", "language", "chatbot", "document", "documents", "summarize",
                        "translation", "sentiment",
                    ],
                ),
                entry(
                    A::ComputerVision,
                    &["image", "images", "vision", "video", "photo", "camera", "visual", "ocr"],
                ),
                entry(
                    A::RecommendationSystem,
                    &["recommend", "recommendation", "recommendations", "personalize", "personalized", "suggestions"],
                ),
                entry(
                    A::PredictiveAnalytics,
                    &["predict", "forecast", "forecasting", "analytics", "trend", "insights", "data"],
                ),
                entry(
                    A::Automation,
                    &["automate", "automation", "automatic", "workflow", "manual", "repetitive", "processing"],
                ),
                entry(
                    A::SpeechRecognition,
                    &["speech", "voice", "audio", "transcription", "transcribe", "dictation"],
                ),
                entry(
                    A::Optimization,
                    &["optimize", "optimization", "scheduling", "routing", "efficiency", "allocation"],
                ),
            ],
            industry_taxonomy: vec![
                entry(
                    Industry::Healthcare,
                    &["health", "healthcare", "medical", "patient", "patients", "clinical", "hospital", "doctor"],
                ),
                entry(
                    Industry::Finance,
                    &["finance", "financial", "bank", "banking", "payment", "payments", "invoice", "accounting", "trading"],
                ),
                entry(
                    Industry::Retail,
                    &["retail", "ecommerce", "e-commerce", "shop", "store", "customer", "customers", "inventory"],
                ),
                entry(
                    Industry::Education,
                    &["education", "student", "students", "teacher", "learning", "course", "school"],
                ),
                entry(
                    Industry::Manufacturing,
                    &["manufacturing", "factory", "production", "supply chain", "logistics", "warehouse"],
                ),
                entry(
                    Industry::Technology,
                    &["software", "developer", "developers", "code", "api", "cloud", "devops", "saas"],
                ),
            ],
            ai_type_maturity: BTreeMap::from([
                (A::MachineLearning, 0.9),
                (A::NaturalLanguageProcessing, 0.85),
                (A::ComputerVision, 0.8),
                (A::RecommendationSystem, 0.9),
                (A::PredictiveAnalytics, 0.85),
                (A::Automation, 0.8),
                (A::SpeechRecognition, 0.75),
                (A::Optimization, 0.8),
            ]),
            ai_type_complexity: BTreeMap::from([
                (A::Automation, 30.0),
                (A::RecommendationSystem, 45.0),
                (A::PredictiveAnalytics, 50.0),
                (A::MachineLearning, 55.0),
                (A::NaturalLanguageProcessing, 60.0),
                (A::Optimization, 60.0),
                (A::ComputerVision, 70.0),
                (A::SpeechRecognition, 75.0),
            ]),
            industry_competitiveness: BTreeMap::from([
                (Industry::Technology, 35.0),
                (Industry::Finance, 32.0),
                (Industry::Retail, 30.0),
                (Industry::Healthcare, 25.0),
                (Industry::Manufacturing, 20.0),
                (Industry::Education, 18.0),
            ]),
            default_industry_competitiveness: 20.0,
            source_credibility: BTreeMap::from([
                ("github".to_string(), 0.9),
                ("stackoverflow".to_string(), 0.85),
                ("hackernews".to_string(), 0.8),
                ("linkedin".to_string(), 0.75),
                ("reddit".to_string(), 0.7),
                ("medium".to_string(), 0.65),
                ("twitter".to_string(), 0.6),
            ]),
            unknown_source_credibility: 0.3,
            credible_sources: kw(&["github", "stackoverflow", "reddit", "hackernews"]),
        }
    }
}

impl KeywordRules {
    pub fn from_json_str(json: &str) -> Result<Self, DomainError> {
        let rules: KeywordRules = serde_json::from_str(json)
            .map_err(|e| DomainError::Config(format!("Invalid keyword rules: {e}")))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Cannot read keyword rules {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject tables that would push scores out of their documented ranges.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(t) = self.pain_tiers.iter().find(|t| t.weight < 0.0) {
            return Err(DomainError::Config(format!(
                "Pain tier '{}' has negative weight",
                t.name
            )));
        }
        let out_of_unit = |v: &f64| !(0.0..=1.0).contains(v);
        if self.ai_type_maturity.values().any(out_of_unit) {
            return Err(DomainError::Config("AI type maturity must be within 0–1".into()));
        }
        if self.source_credibility.values().any(out_of_unit) || out_of_unit(&self.unknown_source_credibility) {
            return Err(DomainError::Config("Source credibility must be within 0–1".into()));
        }
        if self
            .industry_competitiveness
            .values()
            .chain(std::iter::once(&self.default_industry_competitiveness))
            .any(|v| !(0.0..=40.0).contains(v))
        {
            return Err(DomainError::Config(
                "Industry competitiveness must be within 0–40".into(),
            ));
        }
        if self.ai_type_complexity.values().any(|v| !(0.0..=100.0).contains(v)) {
            return Err(DomainError::Config("AI type complexity must be within 0–100".into()));
        }
        Ok(())
    }

    /// Weighted pain-keyword hits in lowercase text.
    pub fn pain_hits(&self, text: &str) -> f64 {
        self.pain_tiers
            .iter()
            .map(|tier| {
                let hits: usize = tier.keywords.iter().map(|k| count_keyword(text, k)).sum();
                hits as f64 * tier.weight
            })
            .sum()
    }

    pub fn has_pain_language(&self, text: &str) -> bool {
        self.pain_tiers
            .iter()
            .any(|tier| tier.keywords.iter().any(|k| count_keyword(text, k) > 0))
    }

    fn lookup_source<'a>(&'a self, source: &str) -> Option<&'a f64> {
        let source = source.trim().to_lowercase();
        self.source_credibility.get(&source).or_else(|| {
            self.source_credibility
                .iter()
                .find(|(name, _)| source.contains(name.as_str()))
                .map(|(_, v)| v)
        })
    }

    pub fn source_credibility(&self, source: &str) -> f64 {
        self.lookup_source(source)
            .copied()
            .unwrap_or(self.unknown_source_credibility)
    }

    pub fn is_credible_source(&self, source: &str) -> bool {
        let source = source.trim().to_lowercase();
        self.credible_sources
            .iter()
            .any(|s| source == *s || source.contains(s.as_str()))
    }

    pub fn maturity(&self, ai_type: AiSolutionType) -> Option<f64> {
        self.ai_type_maturity.get(&ai_type).copied()
    }

    pub fn complexity(&self, ai_type: AiSolutionType) -> Option<f64> {
        self.ai_type_complexity.get(&ai_type).copied()
    }

    pub fn competitiveness(&self, industry: Industry) -> f64 {
        self.industry_competitiveness
            .get(&industry)
            .copied()
            .unwrap_or(self.default_industry_competitiveness)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.iter().any(|s| s == word)
    }
}

/// Rank taxonomy categories by keyword hits in `text`, most hits first.
///
/// Ties keep table order; categories without hits are dropped.
pub fn classify<T: Copy>(taxonomy: &[TaxonomyEntry<T>], text: &str, top: usize) -> Vec<(T, usize)> {
    let mut hits: Vec<(usize, T, usize)> = taxonomy
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let n: usize = e.keywords.iter().map(|k| count_keyword(text, k)).sum();
            (i, e.category, n)
        })
        .filter(|(_, _, n)| *n > 0)
        .collect();
    hits.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    hits.into_iter().take(top).map(|(_, c, n)| (c, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        KeywordRules::default().validate().unwrap();
    }

    #[test]
    fn test_pain_hits_weighted_by_tier() {
        let rules = KeywordRules::default();
        assert_eq!(rules.pain_hits("this is critical"), 25.0);
        assert_eq!(rules.pain_hits("a minor problem"), 3.0 + 8.0);
        assert_eq!(rules.pain_hits("all good here"), 0.0);
    }

    #[test]
    fn test_source_credibility_lookup() {
        let rules = KeywordRules::default();
        assert_eq!(rules.source_credibility("GitHub"), 0.9);
        assert_eq!(rules.source_credibility("reddit/r/startups"), 0.7);
        assert_eq!(rules.source_credibility("myspace"), 0.3);
        assert!(rules.is_credible_source("hackernews"));
        assert!(!rules.is_credible_source("twitter"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let rules = KeywordRules::from_json_str(r#"{"demand_keywords": ["crave"]}"#).unwrap();
        assert_eq!(rules.demand_keywords, vec!["crave".to_string()]);
        assert_eq!(rules.pain_tiers.len(), 4);
        assert_eq!(rules.maturity(AiSolutionType::MachineLearning), Some(0.9));
    }

    #[test]
    fn test_override_with_bad_maturity_rejected() {
        let err = KeywordRules::from_json_str(r#"{"ai_type_maturity": {"nlp": 1.5}}"#).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_classify_orders_by_hits() {
        let rules = KeywordRules::default();
        let found = classify(
            &rules.ai_type_taxonomy,
            "automate the manual workflow and forecast demand",
            3,
        );
        assert_eq!(found[0].0, AiSolutionType::Automation);
        assert_eq!(found[0].1, 3);
        assert_eq!(found[1].0, AiSolutionType::PredictiveAnalytics);
    }
}
