use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aiscout", about = "AI business opportunity discovery from market signals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster a batch of signals and persist new opportunities
    Discover {
        /// JSON file holding an array of market signals
        signals: String,
        #[arg(long)]
        batch_id: Option<String>,
    },
    /// Advanced opportunity score for a set of signals
    Score {
        /// JSON file holding an array of market signals
        signals: String,
        /// JSON with ai_solution_types, target_industries, title, description
        #[arg(long)]
        context: Option<String>,
        /// JSON with ai_feasibility_score, implementation_complexity, market_timing_score
        #[arg(long)]
        agent: Option<String>,
    },
    /// Competitive analysis only
    Analyze {
        /// JSON file holding an array of market signals
        signals: String,
    },
    /// Rank stored opportunities
    Rank {
        /// Status filter (discovered, validating, validated, rejected), repeatable
        #[arg(long)]
        status: Vec<String>,
        /// AI solution type filter, repeatable
        #[arg(long)]
        ai_type: Vec<String>,
        /// Industry filter, repeatable
        #[arg(long)]
        industry: Vec<String>,
        #[arg(long)]
        tag: Vec<String>,
        /// Minimum validation score (0–10)
        #[arg(long)]
        min_validation: Option<f64>,
        /// Minimum AI feasibility score (0–10)
        #[arg(long)]
        min_feasibility: Option<f64>,
        /// Free-text search over title, description and summary
        #[arg(long)]
        search: Option<String>,
        /// Personalise for this user's stored preferences
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "20")]
        page_size: usize,
        /// Primary criteria (validation_score, ai_feasibility, overall_score, market_size, ...)
        #[arg(long)]
        primary: Option<String>,
    },
    /// Opportunities with the most recent validation activity
    Trending {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Personalised recommendations for a user
    Recommend {
        user: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Record a 0–10 validation score
    Validate {
        id: String,
        user: String,
        score: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an opportunity to a new status
    Status {
        id: String,
        /// discovered, validating, validated or rejected
        status: String,
    },
    /// Bookmark an opportunity for a user
    Bookmark {
        user: String,
        id: String,
        /// Remove the bookmark instead
        #[arg(long)]
        remove: bool,
    },
    /// Show or replace a user's ranking preferences
    Prefs {
        user: String,
        /// JSON with preferred_ai_types, preferred_industries, preferred_complexity and weights
        json: Option<String>,
    },
    /// Opportunity counts by status
    Stats,
}
