use crate::domain::error::DomainError;
use serde_json::Value;

/// Key/value cache with per-key expiry.
///
/// Used for performance only: callers must treat every error as a miss.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, DomainError>;
    fn set(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), DomainError>;
    fn delete(&self, key: &str) -> Result<(), DomainError>;
    /// Increment an integer counter, creating it at 1 without expiry.
    fn increment(&self, key: &str) -> Result<i64, DomainError>;
    /// Reset a key's time to live. Returns false when the key does not exist.
    fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool, DomainError>;
}
