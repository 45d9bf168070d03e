//! Draw orchestration.
//!
//! One draw is: acquire the pool lock, load (or seed) the pool, sample
//! without replacement, commit the residual pool, release the lock, then
//! fire the notification. The commit strictly precedes both the release
//! and the notification attempt, so a crash after commit can lose the
//! notification but never the fact that codes were consumed.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::json;

use crate::error::{DrawError, Result};
use crate::lock::{LockCoordinator, DEFAULT_LOCK_TTL};
use crate::notify::{DrawNotification, NotificationSink};
use crate::pool::PoolInitializer;
use crate::store::KeyValueStore;

/// Engine tuning. `Default` matches the documented deployment defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Key the pool lives under.
    pub pool_key: String,
    /// Lock lifetime; bounds unavailability after a crashed holder.
    pub lock_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_key: "lions_codes".to_string(),
            lock_ttl: DEFAULT_LOCK_TTL,
        }
    }
}

/// One draw request.
#[derive(Debug, Clone)]
pub struct DrawRequest<'a> {
    /// How many codes to draw. Clamped to the pool size.
    pub count: usize,
    /// Raw CSV source to seed the pool from, applied only if the pool is
    /// absent or empty (see [`PoolInitializer::ensure`]).
    pub seed_source: Option<&'a str>,
    /// Whether to dispatch the webhook notification after commit.
    pub notify: bool,
}

impl<'a> DrawRequest<'a> {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            seed_source: None,
            notify: true,
        }
    }

    pub fn with_seed(mut self, source: &'a str) -> Self {
        self.seed_source = Some(source);
        self
    }

    /// Suppress the notification step (read-only triggers).
    pub fn silent(mut self) -> Self {
        self.notify = false;
        self
    }
}

/// Result of one draw. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub selected: Vec<String>,
    pub remaining: usize,
}

impl DrawOutcome {
    /// The normal terminal state of an exhausted pool. Not an error.
    pub fn empty() -> Self {
        Self {
            selected: Vec::new(),
            remaining: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Orchestrates exclusive draws against the shared pool.
pub struct ExtractionEngine {
    store: Arc<dyn KeyValueStore>,
    lock: LockCoordinator,
    initializer: PoolInitializer,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl ExtractionEngine {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        let lock = LockCoordinator::new(store.clone());
        let initializer = PoolInitializer::new(store.clone(), config.pool_key.clone());
        Self {
            store,
            lock,
            initializer,
            sink,
            config,
        }
    }

    /// Perform one exclusive draw.
    ///
    /// Returns [`DrawError::Contended`] immediately when another draw holds
    /// the lock; callers should surface that as "retry shortly". An empty
    /// or absent pool yields [`DrawOutcome::empty`] and skips notification.
    pub async fn extract(&self, request: DrawRequest<'_>) -> Result<DrawOutcome> {
        if !self
            .lock
            .acquire(&self.config.pool_key, self.config.lock_ttl)
            .await?
        {
            return Err(DrawError::Contended);
        }

        // Mirror of a try/finally: the lock is released on every path out
        // of the critical section, success or not.
        let drawn = self.draw_and_commit(&request).await;
        self.lock.release(&self.config.pool_key).await;
        let outcome = drawn?;

        if request.notify && !outcome.is_empty() {
            self.dispatch(&outcome).await;
        }

        Ok(outcome)
    }

    /// The critical section: load or seed, sample, commit residual.
    async fn draw_and_commit(&self, request: &DrawRequest<'_>) -> Result<DrawOutcome> {
        let pool = match request.seed_source {
            Some(source) => self.initializer.ensure(source).await?,
            None => self.initializer.current().await?.unwrap_or_default(),
        };

        if pool.is_empty() {
            tracing::info!(key = %self.config.pool_key, "draw on empty pool");
            return Ok(DrawOutcome::empty());
        }

        let (selected, residual) = draw_codes(&pool, request.count);
        self.store
            .set(&self.config.pool_key, json!(residual))
            .await?;

        tracing::info!(
            drawn = selected.len(),
            remaining = residual.len(),
            key = %self.config.pool_key,
            "codes drawn and pool committed"
        );

        Ok(DrawOutcome {
            selected,
            remaining: residual.len(),
        })
    }

    /// Fire-and-forget webhook dispatch. Failure is logged and discarded
    /// here; it must never alter the outcome or the committed pool.
    async fn dispatch(&self, outcome: &DrawOutcome) {
        let notification = DrawNotification::now(outcome.selected.clone(), outcome.remaining);
        match self.sink.send(&notification).await {
            Ok(()) => tracing::info!(codes = outcome.selected.len(), "draw notification delivered"),
            Err(e) => tracing::error!(error = %e, "draw notification failed"),
        }
    }
}

/// Unbiased sampling without replacement: repeatedly remove a uniformly
/// random index from a working copy. A partial Fisher–Yates, so every
/// k-subset is equally likely. Index-based removal keeps duplicate codes
/// safe: one pick consumes one occurrence.
fn draw_codes(pool: &[String], count: usize) -> (Vec<String>, Vec<String>) {
    let mut working = pool.to_vec();
    let k = count.min(working.len());
    let mut selected = Vec::with_capacity(k);
    let mut rng = rand::thread_rng();

    while selected.len() < k {
        let idx = rng.gen_range(0..working.len());
        selected.push(working.remove(idx));
    }

    (selected, working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pool(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn counts(items: &[String]) -> HashMap<&str, usize> {
        let mut map = HashMap::new();
        for item in items {
            *map.entry(item.as_str()).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn draw_partitions_the_pool() {
        let source = pool(&["A", "B", "C", "D", "E"]);
        let (selected, residual) = draw_codes(&source, 3);

        assert_eq!(selected.len(), 3);
        assert_eq!(residual.len(), 2);

        // selected + residual is exactly the original pool, as a multiset
        let mut combined = selected.clone();
        combined.extend(residual.clone());
        assert_eq!(counts(&combined), counts(&source));

        // selected elements are distinct members of the pool
        for code in &selected {
            assert!(source.contains(code));
        }
    }

    #[test]
    fn draw_clamps_to_pool_size() {
        let source = pool(&["A", "B"]);
        let (selected, residual) = draw_codes(&source, 10);
        assert_eq!(selected.len(), 2);
        assert!(residual.is_empty());
    }

    #[test]
    fn draw_zero_takes_nothing() {
        let source = pool(&["A", "B"]);
        let (selected, residual) = draw_codes(&source, 0);
        assert!(selected.is_empty());
        assert_eq!(residual, source);
    }

    #[test]
    fn duplicates_are_consumed_one_occurrence_at_a_time() {
        let source = pool(&["A", "A", "A", "B"]);
        let (selected, residual) = draw_codes(&source, 2);

        assert_eq!(selected.len(), 2);
        assert_eq!(residual.len(), 2);
        let mut combined = selected;
        combined.extend(residual);
        assert_eq!(counts(&combined), counts(&source));
    }

    #[test]
    fn every_element_is_reachable() {
        // With a 1-element draw repeated many times, each code must show up.
        let source = pool(&["A", "B", "C"]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let (selected, _) = draw_codes(&source, 1);
            seen.insert(selected[0].clone());
        }
        assert_eq!(seen.len(), 3);
    }
}
