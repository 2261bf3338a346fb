//! Value objects configuring the ranking system.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::values::ai_solution_type::AiSolutionType;
use crate::domain::values::industry::Industry;
use crate::domain::values::level::Level;
use crate::domain::values::opportunity_status::OpportunityStatus;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Metric a ranking weight applies to. Every metric is read on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriteria {
    ValidationScore,
    AiFeasibility,
    /// Mean of validation, feasibility and confidence.
    OverallScore,
    MarketSize,
    CompetitionLevel,
    ImplementationComplexity,
    CreatedAt,
    UpdatedAt,
    Engagement,
}

impl fmt::Display for RankingCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RankingCriteria::ValidationScore => "validation_score",
            RankingCriteria::AiFeasibility => "ai_feasibility",
            RankingCriteria::OverallScore => "overall_score",
            RankingCriteria::MarketSize => "market_size",
            RankingCriteria::CompetitionLevel => "competition_level",
            RankingCriteria::ImplementationComplexity => "implementation_complexity",
            RankingCriteria::CreatedAt => "created_at",
            RankingCriteria::UpdatedAt => "updated_at",
            RankingCriteria::Engagement => "engagement",
        };
        write!(f, "{s}")
    }
}

impl FromStr for RankingCriteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "validation_score" | "validation" => Ok(RankingCriteria::ValidationScore),
            "ai_feasibility" | "ai_feasibility_score" | "feasibility" => {
                Ok(RankingCriteria::AiFeasibility)
            }
            "overall_score" | "overall" => Ok(RankingCriteria::OverallScore),
            "market_size" => Ok(RankingCriteria::MarketSize),
            "competition_level" | "competition" => Ok(RankingCriteria::CompetitionLevel),
            "implementation_complexity" | "complexity" => {
                Ok(RankingCriteria::ImplementationComplexity)
            }
            "created_at" | "created" => Ok(RankingCriteria::CreatedAt),
            "updated_at" | "updated" => Ok(RankingCriteria::UpdatedAt),
            "engagement" => Ok(RankingCriteria::Engagement),
            _ => Err(format!("Unknown ranking criteria: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// Conjunction of optional predicates over persisted opportunities.
///
/// List predicates match when the opportunity has at least one of the
/// listed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Empty means every status except `rejected`.
    pub statuses: Vec<OpportunityStatus>,
    pub ai_solution_types: Vec<AiSolutionType>,
    pub target_industries: Vec<Industry>,
    pub geographic_scopes: Vec<String>,
    pub tags: Vec<String>,
    pub min_validation_score: Option<f64>,
    pub max_validation_score: Option<f64>,
    pub min_ai_feasibility: Option<f64>,
    pub max_ai_feasibility: Option<f64>,
    pub min_confidence: Option<f64>,
    pub complexity: Vec<Level>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn effective_statuses(&self) -> Vec<OpportunityStatus> {
        if self.statuses.is_empty() {
            OpportunityStatus::VISIBLE.to_vec()
        } else {
            self.statuses.clone()
        }
    }
}

/// Weighting of the rank score.
///
/// `final = base·(1 − p − f − t) + personalization·p + freshness·f + trending·t`
/// where `base = primary·primary_weight + Σ secondary·weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub primary_criteria: RankingCriteria,
    pub primary_weight: f64,
    pub secondary_criteria: Vec<(RankingCriteria, f64)>,
    pub personalization_weight: f64,
    pub freshness_weight: f64,
    pub trending_weight: f64,
    pub enable_personalization: bool,
    pub sort_order: SortOrder,
    pub use_cache: bool,
    pub cache_ttl_secs: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            primary_criteria: RankingCriteria::ValidationScore,
            primary_weight: 0.6,
            secondary_criteria: vec![
                (RankingCriteria::AiFeasibility, 0.25),
                (RankingCriteria::Engagement, 0.15),
            ],
            personalization_weight: 0.3,
            freshness_weight: 0.1,
            trending_weight: 0.2,
            enable_personalization: true,
            sort_order: SortOrder::Desc,
            use_cache: true,
            cache_ttl_secs: 300,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        let weights = std::iter::once(self.primary_weight)
            .chain(self.secondary_criteria.iter().map(|(_, w)| *w))
            .chain([
                self.personalization_weight,
                self.freshness_weight,
                self.trending_weight,
            ]);
        for w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(DomainError::Config(format!(
                    "Ranking weights must be non-negative, got {w}"
                )));
            }
        }

        let base_sum: f64 = self.primary_weight
            + self.secondary_criteria.iter().map(|(_, w)| w).sum::<f64>();
        if (base_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DomainError::Config(format!(
                "Primary and secondary ranking weights must sum to 1.0, got {base_sum:.4}"
            )));
        }

        let adjustments = self.adjustment_weight();
        if adjustments > 1.0 + WEIGHT_TOLERANCE {
            return Err(DomainError::Config(format!(
                "Personalization, freshness and trending weights exceed 1.0 ({adjustments:.4})"
            )));
        }
        Ok(())
    }

    pub fn adjustment_weight(&self) -> f64 {
        self.personalization_weight + self.freshness_weight + self.trending_weight
    }

    /// Weight left over for the base score.
    pub fn base_weight(&self) -> f64 {
        (1.0 - self.adjustment_weight()).max(0.0)
    }
}

/// A user's stated interests, used to personalise rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub user_id: String,
    pub preferred_ai_types: Vec<AiSolutionType>,
    pub preferred_industries: Vec<Industry>,
    pub preferred_complexity: Vec<Level>,
    pub ai_type_weight: f64,
    pub industry_weight: f64,
    pub complexity_weight: f64,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            preferred_ai_types: Vec::new(),
            preferred_industries: Vec::new(),
            preferred_complexity: Vec::new(),
            ai_type_weight: 0.3,
            industry_weight: 0.3,
            complexity_weight: 0.2,
        }
    }
}

impl UserPreferences {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_ai_types.is_empty()
            && self.preferred_industries.is_empty()
            && self.preferred_complexity.is_empty()
    }
}
