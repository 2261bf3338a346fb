use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's assessment of an opportunity, recorded by the validation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub id: String,
    pub opportunity_id: String,
    pub user_id: String,
    /// 0–10.
    pub score: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new(opportunity_id: String, user_id: String, score: f64, notes: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id,
            user_id,
            score,
            notes,
            created_at: Utc::now(),
        }
    }
}
