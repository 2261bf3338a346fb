use crate::domain::error::DomainError;
use crate::domain::values::decay::age_days;
use crate::domain::values::signal_type::SignalType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters reported by the source platform. Absent counters are 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementMetrics {
    pub upvotes: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    /// Precomputed total; when absent the counters are summed.
    pub total_engagement: Option<f64>,
}

impl EngagementMetrics {
    pub fn total(&self) -> f64 {
        self.total_engagement
            .unwrap_or(self.upvotes + self.likes + self.comments + self.shares)
            .max(0.0)
    }

    /// `upvotes·1 + comments·1.5 + shares·2`, likes counted as upvotes.
    pub fn weighted(&self) -> f64 {
        (self.upvotes + self.likes) + self.comments * 1.5 + self.shares * 2.0
    }
}

/// A raw text signal collected upstream (forum post, issue, listing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSignal {
    #[serde(default)]
    pub signal_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub signal_type: SignalType,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub engagement_metrics: EngagementMetrics,
    /// 0–100.
    #[serde(default)]
    pub ai_relevance_score: f64,
    /// 0–1; `None` is read as 0.5.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// -1..1.
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_SIGNAL_CONFIDENCE: f64 = 0.5;

impl MarketSignal {
    pub fn new(
        content: impl Into<String>,
        signal_type: SignalType,
        source: impl Into<String>,
    ) -> Self {
        Self {
            signal_id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            signal_type,
            source: source.into(),
            engagement_metrics: EngagementMetrics::default(),
            ai_relevance_score: 0.0,
            confidence: None,
            sentiment_score: 0.0,
            extracted_at: Some(Utc::now()),
        }
    }

    /// Bring a deserialized record into its documented ranges.
    ///
    /// Missing ids are generated, scores are clamped and non-finite values
    /// reset, so downstream code can read fields without re-checking.
    pub fn normalized(mut self) -> Self {
        if self.signal_id.trim().is_empty() {
            self.signal_id = uuid::Uuid::new_v4().to_string();
        }
        self.ai_relevance_score = finite_or(self.ai_relevance_score, 0.0).clamp(0.0, 100.0);
        self.confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0));
        self.sentiment_score = finite_or(self.sentiment_score, 0.0).clamp(-1.0, 1.0);
        let m = &mut self.engagement_metrics;
        m.upvotes = finite_or(m.upvotes, 0.0).max(0.0);
        m.likes = finite_or(m.likes, 0.0).max(0.0);
        m.comments = finite_or(m.comments, 0.0).max(0.0);
        m.shares = finite_or(m.shares, 0.0).max(0.0);
        m.total_engagement = m.total_engagement.filter(|t| t.is_finite());
        self
    }

    /// Parse a JSON array of signal records and normalize each one.
    pub fn parse_batch(json: &str) -> Result<Vec<MarketSignal>, DomainError> {
        let raw: Vec<MarketSignal> = serde_json::from_str(json)
            .map_err(|e| DomainError::Parse(format!("Invalid signal batch: {e}")))?;
        Ok(raw.into_iter().map(MarketSignal::normalized).collect())
    }

    pub fn engagement(&self) -> f64 {
        self.engagement_metrics.total()
    }

    pub fn confidence_or_default(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_SIGNAL_CONFIDENCE)
    }

    pub fn age_days(&self, now: &DateTime<Utc>) -> Option<f64> {
        self.extracted_at.as_ref().map(|t| age_days(t, now))
    }

    pub fn content_lower(&self) -> String {
        self.content.to_lowercase()
    }

    pub fn with_engagement(mut self, upvotes: f64, comments: f64, shares: f64) -> Self {
        self.engagement_metrics = EngagementMetrics {
            upvotes,
            comments,
            shares,
            ..Default::default()
        };
        self
    }

    pub fn with_ai_relevance(mut self, score: f64) -> Self {
        self.ai_relevance_score = score.clamp(0.0, 100.0);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_extracted_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.extracted_at = at;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.signal_id = id.into();
        self
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}
