use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of market signal emitted by upstream collection.
///
/// Unrecognised strings deserialize to `Other` rather than failing, since
/// collectors are heterogeneous and new kinds show up without notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalType {
    PainPoint,
    FeatureRequest,
    Opportunity,
    Complaint,
    Discussion,
    #[default]
    Other,
}

impl SignalType {
    /// Multiplier applied to demand-keyword hits for this kind of signal.
    pub fn demand_multiplier(&self) -> f64 {
        match self {
            SignalType::FeatureRequest => 1.5,
            SignalType::Opportunity => 1.3,
            SignalType::PainPoint => 1.2,
            SignalType::Complaint => 1.1,
            SignalType::Discussion | SignalType::Other => 1.0,
        }
    }

    /// Whether the signal describes something users lack.
    pub fn expresses_need(&self) -> bool {
        matches!(self, SignalType::PainPoint | SignalType::FeatureRequest)
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::PainPoint => write!(f, "pain_point"),
            SignalType::FeatureRequest => write!(f, "feature_request"),
            SignalType::Opportunity => write!(f, "opportunity"),
            SignalType::Complaint => write!(f, "complaint"),
            SignalType::Discussion => write!(f, "discussion"),
            SignalType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pain_point" | "pain" => Ok(SignalType::PainPoint),
            "feature_request" | "feature" => Ok(SignalType::FeatureRequest),
            "opportunity" => Ok(SignalType::Opportunity),
            "complaint" => Ok(SignalType::Complaint),
            "discussion" => Ok(SignalType::Discussion),
            "other" => Ok(SignalType::Other),
            _ => Err(format!("Unknown signal type: {s}")),
        }
    }
}

impl From<String> for SignalType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(SignalType::Other)
    }
}

impl From<SignalType> for String {
    fn from(t: SignalType) -> Self {
        t.to_string()
    }
}
