//! Signal clustering.
//!
//! Groups raw market signals by lexical similarity and derives the
//! per-cluster metrics that candidate generation and confidence filtering
//! depend on.
//!
//! The pass is greedy and seed-based: each unclustered signal seeds a new
//! cluster and pulls in every later unclustered signal that is similar to
//! the seed. That is O(n²) in batch size, which is fine for batches of a few
//! hundred signals. Large backlogs should be bucketed first (by source or
//! signal type, or by a shared rare token) and clustered per bucket.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::entities::market_signal::MarketSignal;
use crate::domain::error::DomainError;
use crate::domain::values::keyword_rules::KeywordRules;
use crate::domain::values::text::{content_words, jaccard};

const SAME_TYPE_BONUS: f64 = 0.10;
const SAME_SOURCE_BONUS: f64 = 0.05;
const MIN_THEME_LEN: usize = 4;

#[derive(Debug, Clone)]
pub struct ClusteringConfig {
    pub similarity_threshold: f64,
    /// How many dominant themes to keep per cluster.
    pub max_themes: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            max_themes: 5,
        }
    }
}

/// A group of mutually related signals. Always holds at least two signals.
#[derive(Debug, Clone, Serialize)]
pub struct SignalCluster {
    pub cluster_id: String,
    pub signals: Vec<MarketSignal>,
    pub dominant_themes: Vec<String>,
    pub pain_intensity: f64,
    pub market_potential: f64,
    pub ai_opportunity_score: f64,
    pub signal_count: usize,
    pub total_engagement: f64,
    pub avg_sentiment: f64,
    pub confidence_level: f64,
}

impl SignalCluster {
    pub fn signal_ids(&self) -> Vec<String> {
        self.signals.iter().map(|s| s.signal_id.clone()).collect()
    }

    pub fn unique_sources(&self) -> usize {
        self.signals
            .iter()
            .map(|s| s.source.trim().to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }
}

pub struct SignalClusterer {
    config: ClusteringConfig,
    rules: Arc<KeywordRules>,
}

impl SignalClusterer {
    pub fn new(config: ClusteringConfig, rules: Arc<KeywordRules>) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&config.similarity_threshold) {
            return Err(DomainError::Config(format!(
                "Similarity threshold must be within 0–1, got {}",
                config.similarity_threshold
            )));
        }
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster a batch of signals, highest market potential first.
    ///
    /// Fails only when the batch itself is inconsistent (duplicate signal
    /// ids), since cluster membership could then not be traced back.
    pub fn cluster(&self, signals: &[MarketSignal]) -> Result<Vec<SignalCluster>, DomainError> {
        let mut seen = HashSet::new();
        for s in signals {
            if !seen.insert(s.signal_id.as_str()) {
                return Err(DomainError::InvalidInput(format!(
                    "Duplicate signal id in batch: {}",
                    s.signal_id
                )));
            }
        }

        let words: Vec<HashSet<String>> = signals.iter().map(|s| content_words(&s.content)).collect();
        let mut clustered = vec![false; signals.len()];
        let mut clusters = Vec::new();

        for i in 0..signals.len() {
            if clustered[i] {
                continue;
            }
            clustered[i] = true;
            if words[i].is_empty() {
                continue;
            }
            let mut members = vec![i];

            for j in (i + 1)..signals.len() {
                if clustered[j] || words[j].is_empty() {
                    continue;
                }
                let sim = pair_similarity(&signals[i], &words[i], &signals[j], &words[j]);
                if sim >= self.config.similarity_threshold {
                    clustered[j] = true;
                    members.push(j);
                }
            }

            if members.len() >= 2 {
                let member_signals: Vec<MarketSignal> =
                    members.iter().map(|&m| signals[m].clone()).collect();
                clusters.push(self.build_cluster(member_signals));
            } else {
                debug!(signal_id = %signals[i].signal_id, "signal matched no cluster");
            }
        }

        clusters.sort_by(|a, b| {
            b.market_potential
                .partial_cmp(&a.market_potential)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(clusters)
    }

    /// Similarity between two signals as used for cluster membership.
    pub fn similarity(&self, a: &MarketSignal, b: &MarketSignal) -> f64 {
        pair_similarity(a, &content_words(&a.content), b, &content_words(&b.content))
    }

    fn build_cluster(&self, signals: Vec<MarketSignal>) -> SignalCluster {
        let signal_count = signals.len();
        let total_engagement: f64 = signals.iter().map(|s| s.engagement()).sum();
        let avg_sentiment =
            signals.iter().map(|s| s.sentiment_score).sum::<f64>() / signal_count as f64;

        SignalCluster {
            cluster_id: cluster_id(&signals),
            dominant_themes: self.dominant_themes(&signals),
            pain_intensity: self.pain_intensity(&signals),
            market_potential: market_potential(&signals),
            ai_opportunity_score: ai_opportunity_score(&signals),
            confidence_level: self.confidence_level(&signals),
            signal_count,
            total_engagement,
            avg_sentiment,
            signals,
        }
    }

    fn dominant_themes(&self, signals: &[MarketSignal]) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for s in signals {
            for word in content_words(&s.content) {
                if word.chars().count() >= MIN_THEME_LEN
                    && word.chars().any(|c| c.is_alphabetic())
                    && !self.rules.is_stop_word(&word)
                {
                    *counts.entry(word).or_default() += 1;
                }
            }
        }
        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(self.config.max_themes)
            .map(|(w, _)| w)
            .collect()
    }

    /// Mean engagement-amplified pain-keyword weight, capped at 100.
    pub fn pain_intensity(&self, signals: &[MarketSignal]) -> f64 {
        if signals.is_empty() {
            return 0.0;
        }
        let total: f64 = signals
            .iter()
            .map(|s| self.rules.pain_hits(&s.content_lower()) * (1.0 + s.engagement() / 100.0))
            .sum();
        (total / signals.len() as f64).clamp(0.0, 100.0)
    }

    /// Mean of signal-count ramp, mean signal confidence and credible-source share.
    pub fn confidence_level(&self, signals: &[MarketSignal]) -> f64 {
        if signals.is_empty() {
            return 0.0;
        }
        let n = signals.len() as f64;
        let count_factor = (n / 10.0).min(1.0);
        let mean_confidence = signals.iter().map(|s| s.confidence_or_default()).sum::<f64>() / n;
        let credible = signals
            .iter()
            .filter(|s| self.rules.is_credible_source(&s.source))
            .count() as f64
            / n;
        ((count_factor + mean_confidence + credible) / 3.0).clamp(0.0, 1.0)
    }
}

fn pair_similarity(
    a: &MarketSignal,
    a_words: &HashSet<String>,
    b: &MarketSignal,
    b_words: &HashSet<String>,
) -> f64 {
    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }
    let mut sim = jaccard(a_words, b_words);
    if a.signal_type == b.signal_type {
        sim += SAME_TYPE_BONUS;
    }
    if !a.source.is_empty() && a.source.trim().eq_ignore_ascii_case(b.source.trim()) {
        sim += SAME_SOURCE_BONUS;
    }
    sim.min(1.0)
}

/// Stable content hash of the member ids.
fn cluster_id(signals: &[MarketSignal]) -> String {
    let mut ids: Vec<&str> = signals.iter().map(|s| s.signal_id.as_str()).collect();
    ids.sort_unstable();
    let digest = Sha256::digest(ids.join("|").as_bytes());
    format!("cluster_{}", &hex::encode(digest)[..16])
}

/// `min(50, sources·10) + min(30, engagement/10) + min(20, types·5)`.
pub fn market_potential(signals: &[MarketSignal]) -> f64 {
    let sources: HashSet<String> = signals
        .iter()
        .map(|s| s.source.trim().to_lowercase())
        .collect();
    let types: HashSet<_> = signals.iter().map(|s| s.signal_type).collect();
    let engagement: f64 = signals.iter().map(|s| s.engagement()).sum();

    let score = (sources.len() as f64 * 10.0).min(50.0)
        + (engagement / 10.0).min(30.0)
        + (types.len() as f64 * 5.0).min(20.0);
    score.clamp(0.0, 100.0)
}

/// Mean AI relevance plus a consistency bonus of `max(0, 20 − variance)`.
pub fn ai_opportunity_score(signals: &[MarketSignal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let n = signals.len() as f64;
    let mean = signals.iter().map(|s| s.ai_relevance_score).sum::<f64>() / n;
    let variance = signals
        .iter()
        .map(|s| (s.ai_relevance_score - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean + (20.0 - variance).max(0.0)).clamp(0.0, 100.0)
}
