use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::validation::ValidationResult;
use crate::domain::error::DomainError;
use crate::domain::values::opportunity_status::OpportunityStatus;
use crate::domain::values::ranking::{FilterCriteria, UserPreferences};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Pagination {
    /// 1-based page number to an offset window.
    pub fn page(page: usize, page_size: usize) -> Self {
        Self {
            offset: page.saturating_sub(1) * page_size,
            limit: page_size,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct OpportunityStats {
    pub total_opportunities: usize,
    pub by_status: Vec<(String, usize)>,
    pub total_validations: usize,
}

pub trait OpportunityRepository: Send + Sync {
    fn insert(&self, opportunity: &Opportunity) -> Result<(), DomainError>;
    fn get_by_id(&self, id: &str) -> Result<Option<Opportunity>, DomainError>;
    /// Rows matching `filter`, newest first, plus the unpaginated match count.
    fn query(
        &self,
        filter: &FilterCriteria,
        pagination: Option<Pagination>,
    ) -> Result<(Vec<Opportunity>, usize), DomainError>;
    /// Opportunities created at or after `since`, newest first, at most `limit`.
    fn recent_since(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Opportunity>, DomainError>;
    fn update_status(&self, id: &str, status: OpportunityStatus) -> Result<(), DomainError>;
    /// Store a validation and, when given, move the opportunity to
    /// `new_status` in the same transaction.
    fn add_validation(
        &self,
        validation: &ValidationResult,
        new_status: Option<OpportunityStatus>,
    ) -> Result<(), DomainError>;
    fn validations_since(&self, since: DateTime<Utc>) -> Result<Vec<ValidationResult>, DomainError>;
    fn validations_by_user(&self, user_id: &str) -> Result<Vec<ValidationResult>, DomainError>;
    fn add_bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError>;
    fn remove_bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError>;
    fn bookmarks_for_user(&self, user_id: &str) -> Result<Vec<String>, DomainError>;
    fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), DomainError>;
    fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, DomainError>;
    fn stats(&self) -> Result<OpportunityStats, DomainError>;
}
