use crate::domain::error::DomainError;
use crate::domain::ports::opportunity_repository::{OpportunityRepository, OpportunityStats};
use std::sync::Arc;

pub struct StatsUseCase {
    repo: Arc<dyn OpportunityRepository>,
}

impl StatsUseCase {
    pub fn new(repo: Arc<dyn OpportunityRepository>) -> Self {
        Self { repo }
    }

    pub fn stats(&self) -> Result<OpportunityStats, DomainError> {
        self.repo.stats()
    }
}
