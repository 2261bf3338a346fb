pub mod cache;
pub mod opportunity_repository;
