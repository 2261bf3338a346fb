pub mod candidates;
pub mod clustering;
pub mod dedup;
pub mod discovery;
pub mod ranking;
pub mod scoring;
pub mod stats;
pub mod validation;
