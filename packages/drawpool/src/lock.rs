//! Mutual exclusion over a named resource, built on the store's
//! conditional-set primitive.
//!
//! Acquisition is non-blocking: a contended lock is reported immediately so
//! the caller can signal "retry later" upstream instead of spinning. An
//! unreleased lock self-expires after its TTL, which bounds total
//! unavailability after a crashed holder.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Default lock lifetime. Chosen to exceed worst-case draw latency
/// including one outbound notification attempt.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_millis(8000);

/// Acquires and releases short-lived exclusion tokens over named resources.
#[derive(Clone)]
pub struct LockCoordinator {
    store: Arc<dyn KeyValueStore>,
}

impl LockCoordinator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn lock_key(resource: &str) -> String {
        format!("lock:{resource}")
    }

    /// Try to take the lock on `resource`. Returns `false` without waiting
    /// when another holder has it.
    pub async fn acquire(&self, resource: &str, ttl: Duration) -> Result<bool> {
        let acquired = self.store.try_acquire(&Self::lock_key(resource), ttl).await?;
        if !acquired {
            tracing::debug!(resource, "lock contended");
        }
        Ok(acquired)
    }

    /// Release the lock on `resource`. Best effort: a failed delete is
    /// logged and swallowed, since the TTL reclaims the lock anyway.
    pub async fn release(&self, resource: &str) {
        if let Err(e) = self.store.delete(&Self::lock_key(resource)).await {
            tracing::warn!(resource, error = %e, "failed to release lock; TTL will reclaim it");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;

    #[tokio::test]
    async fn second_acquire_is_contended() {
        let store = Arc::new(MemoryStore::new());
        let lock = LockCoordinator::new(store);

        assert!(lock.acquire("pool", DEFAULT_LOCK_TTL).await.unwrap());
        assert!(!lock.acquire("pool", DEFAULT_LOCK_TTL).await.unwrap());
    }

    #[tokio::test]
    async fn release_frees_the_resource() {
        let store = Arc::new(MemoryStore::new());
        let lock = LockCoordinator::new(store);

        assert!(lock.acquire("pool", DEFAULT_LOCK_TTL).await.unwrap());
        lock.release("pool").await;
        assert!(lock.acquire("pool", DEFAULT_LOCK_TTL).await.unwrap());
    }

    #[tokio::test]
    async fn unreleased_lock_expires_after_ttl() {
        let store = Arc::new(MemoryStore::new());
        let lock = LockCoordinator::new(store);
        let ttl = Duration::from_millis(30);

        assert!(lock.acquire("pool", ttl).await.unwrap());
        assert!(!lock.acquire("pool", ttl).await.unwrap());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(lock.acquire("pool", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn distinct_resources_do_not_contend() {
        let store = Arc::new(MemoryStore::new());
        let lock = LockCoordinator::new(store);

        assert!(lock.acquire("pool-a", DEFAULT_LOCK_TTL).await.unwrap());
        assert!(lock.acquire("pool-b", DEFAULT_LOCK_TTL).await.unwrap());
    }
}
