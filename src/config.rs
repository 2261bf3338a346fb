use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::application::clustering::ClusteringConfig;
use crate::application::dedup::DedupConfig;
use crate::application::discovery::EngineConfig;
use crate::application::scoring::advanced::AdvancedWeights;
use crate::application::scoring::market_validation::ValidationWeights;
use crate::domain::error::DomainError;
use crate::domain::values::keyword_rules::KeywordRules;
use crate::domain::values::ranking::RankingConfig;

/// Central configuration loaded from environment variables.
///
/// A `.env` file is picked up by `main` via dotenvy before this runs.
/// Every setting has a default, so an empty environment is valid.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    /// JSON file overriding the built-in keyword rules.
    pub rules_path: Option<PathBuf>,
    pub preferences_ttl_secs: u64,
    pub clustering: ClusteringConfig,
    pub engine: EngineConfig,
    pub dedup: DedupConfig,
    pub validation_weights: ValidationWeights,
    pub advanced_weights: AdvancedWeights,
    pub ranking: RankingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "./aiscout.db".to_string(),
            rules_path: None,
            preferences_ttl_secs: 3600,
            clustering: ClusteringConfig::default(),
            engine: EngineConfig::default(),
            dedup: DedupConfig::default(),
            validation_weights: ValidationWeights::default(),
            advanced_weights: AdvancedWeights::default(),
            ranking: RankingConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, DomainError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| DomainError::Config(format!("{name}={raw}: {e}"))),
        _ => Ok(None),
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, DomainError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let mut config = Self::default();

        if let Some(db) = lookup("AISCOUT_DB").filter(|s| !s.trim().is_empty()) {
            config.db_path = db;
        }
        config.rules_path = lookup("AISCOUT_RULES")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        if let Some(enabled) = parse_var::<bool>(&lookup, "AISCOUT_CACHE")? {
            config.ranking.use_cache = enabled;
        }
        if let Some(ttl) = parse_var(&lookup, "AISCOUT_CACHE_TTL_SECS")? {
            config.ranking.cache_ttl_secs = ttl;
        }
        if let Some(ttl) = parse_var(&lookup, "AISCOUT_PREFERENCES_TTL_SECS")? {
            config.preferences_ttl_secs = ttl;
        }
        if let Some(t) = parse_var(&lookup, "AISCOUT_SIMILARITY_THRESHOLD")? {
            config.clustering.similarity_threshold = t;
        }
        if let Some(n) = parse_var(&lookup, "AISCOUT_MIN_SIGNALS")? {
            config.engine.min_signals_for_opportunity = n;
        }
        if let Some(t) = parse_var(&lookup, "AISCOUT_CONFIDENCE_THRESHOLD")? {
            config.engine.confidence_threshold = t;
        }
        if let Some(n) = parse_var(&lookup, "AISCOUT_MAX_PER_BATCH")? {
            config.engine.max_opportunities_per_batch = n;
        }
        Ok(config)
    }

    /// Keyword rules from `rules_path`, or the built-in table.
    pub fn rules(&self) -> Result<KeywordRules, DomainError> {
        match &self.rules_path {
            Some(path) => KeywordRules::from_json_file(path),
            None => Ok(KeywordRules::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, "./aiscout.db");
        assert_eq!(config.ranking.cache_ttl_secs, 300);
        assert_eq!(config.preferences_ttl_secs, 3600);
        assert_eq!(config.engine.min_signals_for_opportunity, 3);
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("AISCOUT_DB", "/tmp/x.db"),
            ("AISCOUT_SIMILARITY_THRESHOLD", "0.5"),
            ("AISCOUT_MAX_PER_BATCH", "4"),
            ("AISCOUT_CACHE_TTL_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.clustering.similarity_threshold, 0.5);
        assert_eq!(config.engine.max_opportunities_per_batch, 4);
        assert_eq!(config.ranking.cache_ttl_secs, 10);
    }

    #[test]
    fn test_cache_switch() {
        let config = AppConfig::from_lookup(lookup(&[("AISCOUT_CACHE", "false")])).unwrap();
        assert!(!config.ranking.use_cache);
        assert!(AppConfig::from_lookup(lookup(&[("AISCOUT_CACHE", "maybe")])).is_err());
    }

    #[test]
    fn test_unparseable_value_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("AISCOUT_MIN_SIGNALS", "three")])).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_missing_rules_file_is_config_error() {
        let config = AppConfig::from_lookup(lookup(&[("AISCOUT_RULES", "/nonexistent/rules.json")])).unwrap();
        assert!(matches!(config.rules(), Err(DomainError::Config(_))));
    }
}
