//! Spy and fault-injection doubles for tests.
//!
//! These live in the library (not behind `cfg(test)`) so downstream crates
//! can drive the engine against controlled storage and notification
//! behavior in their own tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DrawError, NotifyError, NotifyResult, Result};
use crate::notify::{DrawNotification, NotificationSink};
use crate::store::KeyValueStore;
use crate::stores::MemoryStore;

// =============================================================================
// Spy Notification Sink
// =============================================================================

/// Records every notification; optionally fails queued deliveries.
pub struct SpySink {
    sent: Mutex<Vec<DrawNotification>>,
    failures: Mutex<Vec<u16>>,
}

impl SpySink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Queue one delivery failure with the given webhook status.
    pub fn with_failure(self, status: u16) -> Self {
        self.failures.lock().unwrap().push(status);
        self
    }

    /// All notifications that were delivered (failed attempts excluded).
    pub fn sent(&self) -> Vec<DrawNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for SpySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for SpySink {
    async fn send(&self, notification: &DrawNotification) -> NotifyResult<()> {
        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            let status = failures.remove(0);
            return Err(NotifyError::Status { status });
        }
        drop(failures);

        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// =============================================================================
// Failing Store
// =============================================================================

/// Which failure class an injected fault raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Transient,
    Fatal,
}

impl FaultKind {
    fn to_error(self, op: &str) -> DrawError {
        match self {
            FaultKind::Transient => {
                DrawError::StoreUnavailable(format!("injected transient {op} failure").into())
            }
            FaultKind::Fatal => DrawError::StoreFatal(format!("injected fatal {op} failure").into()),
        }
    }
}

#[derive(Default)]
struct Faults {
    get: Option<FaultKind>,
    set: Option<FaultKind>,
    delete: Option<FaultKind>,
    acquire: Option<FaultKind>,
}

/// A memory store with per-operation injectable failures.
pub struct FailingStore {
    inner: MemoryStore,
    faults: Mutex<Faults>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn fail_get(self, kind: FaultKind) -> Self {
        self.faults.lock().unwrap().get = Some(kind);
        self
    }

    pub fn fail_set(self, kind: FaultKind) -> Self {
        self.faults.lock().unwrap().set = Some(kind);
        self
    }

    pub fn fail_delete(self, kind: FaultKind) -> Self {
        self.faults.lock().unwrap().delete = Some(kind);
        self
    }

    pub fn fail_acquire(self, kind: FaultKind) -> Self {
        self.faults.lock().unwrap().acquire = Some(kind);
        self
    }

    /// Direct access to the backing store for seeding and assertions.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(kind) = self.faults.lock().unwrap().get {
            return Err(kind.to_error("get"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if let Some(kind) = self.faults.lock().unwrap().set {
            return Err(kind.to_error("set"));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some(kind) = self.faults.lock().unwrap().delete {
            return Err(kind.to_error("delete"));
        }
        self.inner.delete(key).await
    }

    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        if let Some(kind) = self.faults.lock().unwrap().acquire {
            return Err(kind.to_error("try_acquire"));
        }
        self.inner.try_acquire(key, ttl).await
    }
}

// =============================================================================
// Probe Store (critical-section overlap instrumentation)
// =============================================================================

/// Wraps a store and counts lock holders: incremented on a successful
/// `try_acquire` of a `lock:`-prefixed key, decremented on its delete.
/// `max_concurrent` proves (or disproves) mutual exclusion under load.
pub struct ProbeStore {
    inner: Arc<dyn KeyValueStore>,
    holders: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl ProbeStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner,
            holders: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    /// Highest number of simultaneous lock holders observed.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

fn is_lock_key(key: &str) -> bool {
    key.starts_with("lock:")
}

#[async_trait]
impl KeyValueStore for ProbeStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let held = is_lock_key(key) && self.inner.get(key).await?.is_some();
        self.inner.delete(key).await?;
        if held {
            self.holders.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let acquired = self.inner.try_acquire(key, ttl).await?;
        if acquired && is_lock_key(key) {
            let now = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        }
        Ok(acquired)
    }
}
