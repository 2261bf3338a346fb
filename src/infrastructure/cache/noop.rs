use crate::domain::error::DomainError;
use crate::domain::ports::cache::Cache;
use serde_json::Value;

/// Cache that stores nothing. Every read is a miss.
pub struct NoopCache;

impl Cache for NoopCache {
    fn get(&self, _key: &str) -> Result<Option<Value>, DomainError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &Value, _ttl_secs: u64) -> Result<(), DomainError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), DomainError> {
        Ok(())
    }

    fn increment(&self, _key: &str) -> Result<i64, DomainError> {
        Ok(1)
    }

    fn expire(&self, _key: &str, _ttl_secs: u64) -> Result<bool, DomainError> {
        Ok(false)
    }
}
