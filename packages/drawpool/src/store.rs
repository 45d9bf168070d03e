//! The key-value storage capability.
//!
//! Exactly four operations: the three obvious ones plus `try_acquire`, the
//! single atomicity-critical primitive the lock is built on. Backends live
//! in [`crate::stores`]; orchestration code only ever sees
//! `Arc<dyn KeyValueStore>`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Durable mapping from string key to JSON value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Return the last value written for `key`, or `None` if never set or
    /// deleted.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrite `key` atomically and durably.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`. Idempotent; deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically create `key` with expiry `ttl` only if it is currently
    /// absent. Returns `true` iff creation occurred.
    ///
    /// This must be one indivisible operation at the storage layer
    /// (SET NX PX or equivalent), never a read-then-write sequence, or the
    /// mutual-exclusion guarantee breaks under concurrent callers.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
