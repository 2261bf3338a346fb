//! Validation workflow: user assessments and status transitions.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::opportunity::Opportunity;
use crate::domain::entities::validation::ValidationResult;
use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_repository::OpportunityRepository;
use crate::domain::values::opportunity_status::OpportunityStatus;

pub struct ValidationUseCase {
    repo: Arc<dyn OpportunityRepository>,
}

impl ValidationUseCase {
    pub fn new(repo: Arc<dyn OpportunityRepository>) -> Self {
        Self { repo }
    }

    fn load(&self, id: &str) -> Result<Opportunity, DomainError> {
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Opportunity {id}")))
    }

    /// Record a 0–10 assessment. A freshly discovered opportunity moves to
    /// `validating` on its first assessment.
    pub fn validate(
        &self,
        opportunity_id: &str,
        user_id: &str,
        score: f64,
        notes: Option<String>,
    ) -> Result<ValidationResult, DomainError> {
        if !score.is_finite() || !(0.0..=10.0).contains(&score) {
            return Err(DomainError::InvalidInput(format!(
                "Validation score must be within 0–10, got {score}"
            )));
        }
        if user_id.trim().is_empty() {
            return Err("User id is required".into());
        }
        let opportunity = self.load(opportunity_id)?;
        if opportunity.status == OpportunityStatus::Rejected {
            return Err(DomainError::InvalidInput(format!(
                "Opportunity {opportunity_id} is rejected"
            )));
        }

        let result = ValidationResult::new(opportunity_id.to_string(), user_id.to_string(), score, notes);
        let promote = (opportunity.status == OpportunityStatus::Discovered)
            .then_some(OpportunityStatus::Validating);
        self.repo.add_validation(&result, promote)?;
        info!(opportunity_id, user_id, score, "Validation recorded");
        Ok(result)
    }

    /// Apply an explicit status change, refusing backward moves.
    pub fn set_status(&self, opportunity_id: &str, status: OpportunityStatus) -> Result<Opportunity, DomainError> {
        let opportunity = self.load(opportunity_id)?;
        if !opportunity.status.can_transition_to(status) {
            return Err(DomainError::InvalidInput(format!(
                "Cannot move opportunity from {} to {}",
                opportunity.status, status
            )));
        }
        self.repo.update_status(opportunity_id, status)?;
        info!(opportunity_id, from = %opportunity.status, to = %status, "Status changed");
        self.load(opportunity_id)
    }

    pub fn bookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        self.repo.add_bookmark(user_id, opportunity_id)
    }

    pub fn unbookmark(&self, user_id: &str, opportunity_id: &str) -> Result<(), DomainError> {
        self.repo.remove_bookmark(user_id, opportunity_id)
    }
}
