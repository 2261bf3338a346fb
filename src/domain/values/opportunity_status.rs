use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a persisted opportunity.
///
/// Transitions only move one step forward: `discovered → validating →
/// validated`, with `rejected` reachable from any non-rejected state. Rejection is a
/// status, not a deletion, and there is no way back out of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Discovered,
    Validating,
    Validated,
    Rejected,
}

impl OpportunityStatus {
    /// Statuses shown in listings when the caller does not ask for any.
    pub const VISIBLE: [OpportunityStatus; 3] = [
        OpportunityStatus::Discovered,
        OpportunityStatus::Validating,
        OpportunityStatus::Validated,
    ];

    pub fn can_transition_to(&self, next: OpportunityStatus) -> bool {
        use OpportunityStatus::*;
        matches!(
            (self, next),
            (Discovered, Validating) | (Validating, Validated) | (Discovered | Validating | Validated, Rejected)
        )
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityStatus::Discovered => write!(f, "discovered"),
            OpportunityStatus::Validating => write!(f, "validating"),
            OpportunityStatus::Validated => write!(f, "validated"),
            OpportunityStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discovered" => Ok(OpportunityStatus::Discovered),
            "validating" => Ok(OpportunityStatus::Validating),
            "validated" => Ok(OpportunityStatus::Validated),
            "rejected" => Ok(OpportunityStatus::Rejected),
            _ => Err(format!(
                "Unknown status: {s}. Use discovered, validating, validated or rejected"
            )),
        }
    }
}
