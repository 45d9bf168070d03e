//! Redis storage backend.
//!
//! The production backend: state survives restarts and is shared between
//! instances, and `SET NX PX` gives the indivisible conditional-set the
//! lock protocol requires. Uses a multiplexed async connection per
//! operation for efficient connection reuse.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, ExistenceCheck, SetExpiry, SetOptions};
use serde_json::Value;

use crate::error::{DrawError, Result};
use crate::store::KeyValueStore;

/// Key-value store backed by Redis.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Create a store from a connection URL, e.g. `redis://localhost:6379`.
    pub fn new(connection_url: &str) -> Result<Self> {
        let client = Client::open(connection_url).map_err(classify)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(classify)
    }
}

/// Split Redis failures into retryable unavailability (connection refused,
/// dropped connections, timeouts, DNS) and everything else, which callers
/// must treat as fatal.
fn classify(err: redis::RedisError) -> DrawError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
    {
        DrawError::StoreUnavailable(Box::new(err))
    } else {
        DrawError::StoreFatal(Box::new(err))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await.map_err(classify)?;
        match raw {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    DrawError::malformed(format!("stored value at '{key}' is not JSON: {e}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut conn = self.connection().await?;
        let json = value.to_string();
        conn.set::<_, _, ()>(key, json).await.map_err(classify)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(classify)
    }

    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.connection().await?;
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::PX(ttl.as_millis() as u64));
        // SET NX PX answers OK when the key was created, nil otherwise.
        let reply: Option<String> = conn
            .set_options(key, "held", options)
            .await
            .map_err(classify)?;
        Ok(reply.is_some())
    }
}
