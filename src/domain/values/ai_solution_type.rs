use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of AI technique an opportunity would be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AiSolutionType {
    MachineLearning,
    NaturalLanguageProcessing,
    ComputerVision,
    RecommendationSystem,
    PredictiveAnalytics,
    Automation,
    SpeechRecognition,
    Optimization,
    Other,
}

impl AiSolutionType {
    pub const ALL: [AiSolutionType; 8] = [
        AiSolutionType::MachineLearning,
        AiSolutionType::NaturalLanguageProcessing,
        AiSolutionType::ComputerVision,
        AiSolutionType::RecommendationSystem,
        AiSolutionType::PredictiveAnalytics,
        AiSolutionType::Automation,
        AiSolutionType::SpeechRecognition,
        AiSolutionType::Optimization,
    ];

    /// Human-readable label used in generated text.
    pub fn label(&self) -> &'static str {
        match self {
            AiSolutionType::MachineLearning => "machine learning",
            AiSolutionType::NaturalLanguageProcessing => "natural language processing",
            AiSolutionType::ComputerVision => "computer vision",
            AiSolutionType::RecommendationSystem => "recommendation",
            AiSolutionType::PredictiveAnalytics => "predictive analytics",
            AiSolutionType::Automation => "automation",
            AiSolutionType::SpeechRecognition => "speech recognition",
            AiSolutionType::Optimization => "optimization",
            AiSolutionType::Other => "AI",
        }
    }
}

impl fmt::Display for AiSolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AiSolutionType::MachineLearning => "machine_learning",
            AiSolutionType::NaturalLanguageProcessing => "natural_language_processing",
            AiSolutionType::ComputerVision => "computer_vision",
            AiSolutionType::RecommendationSystem => "recommendation_system",
            AiSolutionType::PredictiveAnalytics => "predictive_analytics",
            AiSolutionType::Automation => "automation",
            AiSolutionType::SpeechRecognition => "speech_recognition",
            AiSolutionType::Optimization => "optimization",
            AiSolutionType::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AiSolutionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "machine_learning" | "ml" => Ok(AiSolutionType::MachineLearning),
            "natural_language_processing" | "nlp" => Ok(AiSolutionType::NaturalLanguageProcessing),
            "computer_vision" | "cv" => Ok(AiSolutionType::ComputerVision),
            "recommendation_system" | "recommendation" => Ok(AiSolutionType::RecommendationSystem),
            "predictive_analytics" | "predictive" => Ok(AiSolutionType::PredictiveAnalytics),
            "automation" => Ok(AiSolutionType::Automation),
            "speech_recognition" | "speech" => Ok(AiSolutionType::SpeechRecognition),
            "optimization" => Ok(AiSolutionType::Optimization),
            "other" => Ok(AiSolutionType::Other),
            _ => Err(format!("Unknown AI solution type: {s}")),
        }
    }
}

impl From<String> for AiSolutionType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(AiSolutionType::Other)
    }
}

impl From<AiSolutionType> for String {
    fn from(t: AiSolutionType) -> Self {
        t.to_string()
    }
}
