//! In-process cache backed by `DashMap`.

use crate::domain::error::DomainError;
use crate::domain::ports::cache::Cache;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// `None` never expires.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Every this many writes, expired entries are swept from the whole map.
const SWEEP_EVERY: u64 = 64;

fn deadline(ttl_secs: u64) -> Option<Instant> {
    Instant::now().checked_add(Duration::from_secs(ttl_secs))
}

/// Key/value cache with per-key expiry. Expired keys read as misses; they
/// are dropped when touched and by a periodic sweep on write, so keys that
/// are never read again do not accumulate.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    writes: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of keys held, expired ones included until they are swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        Ok(None)
    }

    fn set(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), DomainError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: deadline(ttl_secs),
            },
        );
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            self.purge_expired();
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.entries.remove(key);
        Ok(())
    }

    fn increment(&self, key: &str) -> Result<i64, DomainError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::from(0),
            expires_at: None,
        });
        if entry.is_expired(now) {
            *entry = Entry {
                value: Value::from(0),
                expires_at: None,
            };
        }
        let current = entry.value.as_i64().ok_or_else(|| {
            DomainError::Cache(format!("Value at '{key}' is not an integer"))
        })?;
        let next = current + 1;
        entry.value = Value::from(next);
        Ok(next)
    }

    fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool, DomainError> {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.expires_at = deadline(ttl_secs);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
