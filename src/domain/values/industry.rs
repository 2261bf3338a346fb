use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Industry {
    Healthcare,
    Finance,
    Retail,
    Education,
    Manufacturing,
    Technology,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Healthcare,
        Industry::Finance,
        Industry::Retail,
        Industry::Education,
        Industry::Manufacturing,
        Industry::Technology,
    ];
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Industry::Healthcare => write!(f, "healthcare"),
            Industry::Finance => write!(f, "finance"),
            Industry::Retail => write!(f, "retail"),
            Industry::Education => write!(f, "education"),
            Industry::Manufacturing => write!(f, "manufacturing"),
            Industry::Technology => write!(f, "technology"),
            Industry::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthcare" | "health" => Ok(Industry::Healthcare),
            "finance" | "fintech" => Ok(Industry::Finance),
            "retail" | "ecommerce" | "e-commerce" => Ok(Industry::Retail),
            "education" | "edtech" => Ok(Industry::Education),
            "manufacturing" => Ok(Industry::Manufacturing),
            "technology" | "tech" | "software" => Ok(Industry::Technology),
            "other" => Ok(Industry::Other),
            _ => Err(format!("Unknown industry: {s}")),
        }
    }
}

impl From<String> for Industry {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Industry::Other)
    }
}

impl From<Industry> for String {
    fn from(i: Industry) -> Self {
        i.to_string()
    }
}
