use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-step ordinal used for competition level and implementation complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Competition buckets: ≥75 high, ≥45 medium, else low.
    pub fn from_competition_score(score: f64) -> Self {
        if score >= 75.0 {
            Level::High
        } else if score >= 45.0 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    /// Complexity buckets: <40 low, <65 medium, else high.
    pub fn from_complexity_score(score: f64) -> Self {
        if score < 40.0 {
            Level::Low
        } else if score < 65.0 {
            Level::Medium
        } else {
            Level::High
        }
    }

    /// Ranking value where lower competition / complexity is better.
    pub fn inverted_score(&self) -> f64 {
        match self {
            Level::Low => 100.0,
            Level::Medium => 50.0,
            Level::High => 10.0,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::Medium => write!(f, "medium"),
            Level::High => write!(f, "high"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" | "med" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            _ => Err(format!("Unknown level: {s}. Use low, medium or high")),
        }
    }
}

/// Where an opportunity sits relative to its competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPositioning {
    BlueOcean,
    Niche,
    RedOcean,
}

impl fmt::Display for MarketPositioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketPositioning::BlueOcean => write!(f, "blue_ocean"),
            MarketPositioning::Niche => write!(f, "niche"),
            MarketPositioning::RedOcean => write!(f, "red_ocean"),
        }
    }
}

impl FromStr for MarketPositioning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blue_ocean" => Ok(MarketPositioning::BlueOcean),
            "niche" => Ok(MarketPositioning::Niche),
            "red_ocean" => Ok(MarketPositioning::RedOcean),
            _ => Err(format!("Unknown market positioning: {s}")),
        }
    }
}
