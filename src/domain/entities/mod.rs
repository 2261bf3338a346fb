pub mod market_signal;
pub mod opportunity;
pub mod validation;
