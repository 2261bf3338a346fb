//! Shared test helpers.
#![allow(dead_code)]

use aiscout::config::AppConfig;
use aiscout::domain::entities::market_signal::MarketSignal;
use aiscout::domain::entities::opportunity::Opportunity;
use aiscout::domain::error::DomainError;
use aiscout::domain::ports::cache::Cache;
use aiscout::domain::values::signal_type::SignalType;
use aiscout::infrastructure::cache::memory::MemoryCache;
use aiscout::infrastructure::sqlite::opportunity_repo::SqliteOpportunityRepo;
use aiscout::AiScout;
use serde_json::Value;
use std::sync::Arc;

pub fn config() -> AppConfig {
    AppConfig {
        db_path: ":memory:".to_string(),
        ..Default::default()
    }
}

pub fn setup() -> AiScout {
    AiScout::new(&config()).unwrap()
}

/// Facade plus direct access to its store, for seeding opportunities.
pub fn setup_with_repo() -> (AiScout, Arc<SqliteOpportunityRepo>) {
    setup_with(config(), Arc::new(MemoryCache::new()))
}

pub fn setup_with(config: AppConfig, cache: Arc<dyn Cache>) -> (AiScout, Arc<SqliteOpportunityRepo>) {
    let repo = Arc::new(SqliteOpportunityRepo::open(":memory:").unwrap());
    let scout = AiScout::with_parts(&config, repo.clone(), cache).unwrap();
    (scout, repo)
}

pub fn signal(id: &str, content: &str, signal_type: SignalType, source: &str) -> MarketSignal {
    MarketSignal::new(content, signal_type, source).with_id(id)
}

/// Three near-identical invoice complaints from credible sources.
pub fn invoice_signals(prefix: &str) -> Vec<MarketSignal> {
    let base = "manual invoice reconciliation takes hours every week for our accounting team";
    ["again", "honestly", "sadly"]
        .iter()
        .zip(["github", "reddit", "stackoverflow"])
        .enumerate()
        .map(|(i, (extra, source))| {
            signal(
                &format!("{prefix}-inv-{i}"),
                &format!("{base} {extra}"),
                SignalType::PainPoint,
                source,
            )
            .with_engagement(40.0, 12.0, 3.0)
            .with_ai_relevance(70.0)
            .with_confidence(0.9)
        })
        .collect()
}

/// Three near-identical scheduling complaints from credible sources.
pub fn scheduling_signals(prefix: &str) -> Vec<MarketSignal> {
    let base = "patient appointment scheduling by phone wastes staff time at the clinic";
    ["daily", "constantly", "lately"]
        .iter()
        .zip(["github", "reddit", "hackernews"])
        .enumerate()
        .map(|(i, (extra, source))| {
            signal(
                &format!("{prefix}-sched-{i}"),
                &format!("{base} {extra}"),
                SignalType::Complaint,
                source,
            )
            .with_engagement(25.0, 8.0, 1.0)
            .with_ai_relevance(60.0)
            .with_confidence(0.9)
        })
        .collect()
}

pub fn unrelated_signal(id: &str) -> MarketSignal {
    signal(
        id,
        "dark mode theme toggle on the mobile app please",
        SignalType::FeatureRequest,
        "twitter",
    )
}

/// Opportunity with the given 0–10 scores, ready to insert.
pub fn opportunity(title: &str, validation: f64, feasibility: f64) -> Opportunity {
    let mut o = Opportunity::new(
        title.to_string(),
        format!("{title} description"),
        format!("{title} summary"),
    );
    o.validation_score = validation;
    o.ai_feasibility_score = feasibility;
    o.confidence_rating = 7.0;
    o
}

/// Cache whose backend is always down.
pub struct FailingCache;

impl Cache for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<Value>, DomainError> {
        Err(DomainError::Cache("connection refused".into()))
    }

    fn set(&self, _key: &str, _value: &Value, _ttl_secs: u64) -> Result<(), DomainError> {
        Err(DomainError::Cache("connection refused".into()))
    }

    fn delete(&self, _key: &str) -> Result<(), DomainError> {
        Err(DomainError::Cache("connection refused".into()))
    }

    fn increment(&self, _key: &str) -> Result<i64, DomainError> {
        Err(DomainError::Cache("connection refused".into()))
    }

    fn expire(&self, _key: &str, _ttl_secs: u64) -> Result<bool, DomainError> {
        Err(DomainError::Cache("connection refused".into()))
    }
}
