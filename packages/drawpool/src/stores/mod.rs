//! Storage backends implementing [`crate::store::KeyValueStore`].
//!
//! - [`MemoryStore`] - process-local, for development and tests
//! - [`RedisStore`] - shared backend for real deployments (feature `redis`)

mod memory;

pub use memory::MemoryStore;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
