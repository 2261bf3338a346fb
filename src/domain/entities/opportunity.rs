use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::industry::Industry;
use crate::domain::values::level::{Level, MarketPositioning};
use crate::domain::values::opportunity_status::OpportunityStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted AI business opportunity.
///
/// Scores are stored on a 0–10 scale; the scoring engines work on 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub summary: String,
    #[serde(default)]
    pub proposed_solution: String,
    pub ai_solution_types: Vec<AiSolutionType>,
    pub target_industries: Vec<Industry>,
    pub tags: Vec<String>,
    /// Ids of the signals this opportunity was synthesised from.
    pub market_signals: Vec<String>,
    pub status: OpportunityStatus,
    pub validation_score: f64,
    pub ai_feasibility_score: f64,
    pub confidence_rating: f64,
    pub overall_score: Option<f64>,
    pub competition_level: Option<Level>,
    pub implementation_complexity: Option<Level>,
    pub market_positioning: Option<MarketPositioning>,
    pub geographic_scope: Option<String>,
    /// Free-form market payload; `market_size` (USD) feeds ranking.
    pub market_data: Option<serde_json::Value>,
    /// Combined engagement of the source signals.
    pub signal_engagement: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn new(title: String, description: String, summary: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            summary,
            proposed_solution: String::new(),
            ai_solution_types: Vec::new(),
            target_industries: Vec::new(),
            tags: Vec::new(),
            market_signals: Vec::new(),
            status: OpportunityStatus::Discovered,
            validation_score: 0.0,
            ai_feasibility_score: 0.0,
            confidence_rating: 0.0,
            overall_score: None,
            competition_level: None,
            implementation_complexity: None,
            market_positioning: None,
            geographic_scope: None,
            market_data: None,
            signal_engagement: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text used for duplicate detection. Built the same way as
    /// `OpportunityCandidate::comparison_text`.
    pub fn comparison_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Market size in USD from the `market_size` field of the market payload.
    pub fn market_size_usd(&self) -> Option<f64> {
        self.market_data
            .as_ref()
            .and_then(|d| d.get("market_size"))
            .and_then(|v| v.as_f64())
    }
}

/// Rescale an internal 0–100 score to the 0–10 storage scale.
pub fn to_storage_scale(score: f64) -> f64 {
    (score / 10.0).clamp(0.0, 10.0)
}
