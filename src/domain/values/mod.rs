pub mod ai_solution_type;
pub mod decay;
pub mod industry;
pub mod keyword_rules;
pub mod level;
pub mod opportunity_status;
pub mod ranking;
pub mod signal_type;
pub mod text;
