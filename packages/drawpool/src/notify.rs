//! Best-effort notification of completed draws.
//!
//! The sink is called after the residual pool is committed. Delivery is
//! at-least-once at best: the engine awaits one bounded attempt, logs any
//! failure, and never retries within the request.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{NotifyError, NotifyResult};

/// Payload posted downstream after a successful draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawNotification {
    pub extracted_codes: Vec<String>,
    /// ISO-8601 timestamp of the draw.
    pub timestamp: String,
    pub remaining_count: usize,
}

impl DrawNotification {
    pub fn now(extracted_codes: Vec<String>, remaining_count: usize) -> Self {
        Self {
            extracted_codes,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            remaining_count,
        }
    }
}

/// Delivers a draw notification downstream.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &DrawNotification) -> NotifyResult<()>;
}

/// Sink for deployments with no webhook configured. Accepts everything.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn send(&self, _notification: &DrawNotification) -> NotifyResult<()> {
        Ok(())
    }
}

/// Posts each draw as JSON to a configured webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    endpoint: String,
}

/// Cap on one delivery attempt, connect time included.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

impl WebhookSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("webhook HTTP client should build");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, notification: &DrawNotification) -> NotifyResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
