//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::store::KeyValueStore;

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory key-value store.
///
/// Useful for testing and local development without a Redis instance.
/// Not suitable for production as data is lost on restart and is not
/// shared between processes. Expiry is lazy: an expired key is dropped
/// the next time it is read or contended for.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().unwrap().insert(
            key.to_string(),
            Entry {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        // One write lock spans the check and the insert, which is what
        // makes this compare-and-swap rather than read-then-write.
        let mut entries = self.entries.write().unwrap();
        if entries.get(key).is_some_and(|e| !e.is_expired()) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::String("held".to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(true)
    }
}
