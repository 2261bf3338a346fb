pub mod advanced;
pub mod competitive;
pub mod market_validation;

use crate::domain::error::DomainError;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weights must be non-negative and sum to 1.0.
pub(crate) fn check_weights(name: &str, weights: &[f64]) -> Result<(), DomainError> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(DomainError::Config(format!(
            "{name} weights must be non-negative, got {w}"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(DomainError::Config(format!(
            "{name} weights must sum to 1.0, got {sum:.4}"
        )));
    }
    Ok(())
}
