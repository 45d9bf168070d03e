//! Exclusive Extraction Protocol for a Shared Code Pool
//!
//! A small library that draws a batch of unique codes from a shared pool
//! held in a key-value store, guarantees at most one concurrent draw via a
//! TTL-bounded lock, durably commits the depleted pool, and delivers a
//! best-effort webhook notification.
//!
//! # Design Philosophy
//!
//! **"Commit first, notify later"**
//!
//! - The lock is the sole guard for pool mutation
//! - The residual pool is committed before the lock is released and before
//!   any notification attempt
//! - Notification failures are logged and swallowed, never re-entering the
//!   draw's error path
//! - Storage is an injected capability, so tests swap in the in-memory
//!   backend without touching orchestration
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use drawpool::{ExtractionEngine, EngineConfig, DrawRequest, MemoryStore, NullSink};
//!
//! let store = Arc::new(MemoryStore::new());
//! let engine = ExtractionEngine::new(store, Arc::new(NullSink), EngineConfig::default());
//!
//! let outcome = engine
//!     .extract(DrawRequest::new(15).with_seed("A1,B2,C3\nD4,E5,F6"))
//!     .await?;
//! println!("drew {} codes, {} left", outcome.selected.len(), outcome.remaining);
//! ```
//!
//! # Modules
//!
//! - [`store`] - The `KeyValueStore` capability trait
//! - [`stores`] - Storage backends (MemoryStore, RedisStore)
//! - [`lock`] - TTL lock coordinator over the store's conditional-set
//! - [`pool`] - Pool bootstrap and administrative reset
//! - [`engine`] - Draw orchestration and unbiased sampling
//! - [`notify`] - Webhook notification sink
//! - [`testing`] - Spy and fault-injection doubles for tests

pub mod engine;
pub mod error;
pub mod lock;
pub mod notify;
pub mod pool;
pub mod store;
pub mod stores;
pub mod testing;

// Re-export core types at crate root
pub use engine::{DrawOutcome, DrawRequest, EngineConfig, ExtractionEngine};
pub use error::{DrawError, NotifyError, Result};
pub use lock::{LockCoordinator, DEFAULT_LOCK_TTL};
pub use notify::{DrawNotification, NotificationSink, NullSink, WebhookSink};
pub use pool::PoolInitializer;
pub use store::KeyValueStore;
pub use stores::MemoryStore;

#[cfg(feature = "redis")]
pub use stores::RedisStore;
