pub mod migrations;
pub mod opportunity_repo;
