//! Typed errors for the draw protocol.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: contention and transient storage failures are
//! retryable, fatal storage failures are not.

use thiserror::Error;

/// Errors that can occur during draw operations.
#[derive(Debug, Error)]
pub enum DrawError {
    /// The pool lock is held by another draw. Retryable; not an error of
    /// severity, callers should signal "try again shortly" upstream.
    #[error("another extraction is in progress")]
    Contended,

    /// The storage backend is temporarily unreachable (connection refused,
    /// timeout, DNS). Retryable.
    #[error("storage backend unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The storage backend answered but the operation cannot succeed
    /// (malformed stored value, protocol error). Not retryable.
    #[error("storage error: {0}")]
    StoreFatal(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A seed or reset source produced no usable codes.
    #[error("invalid code source: {reason}")]
    InvalidSource { reason: String },
}

impl DrawError {
    /// Whether a caller-side retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DrawError::Contended | DrawError::StoreUnavailable(_))
    }

    /// Shorthand for a fatal error carrying a malformed stored value.
    pub fn malformed(context: impl Into<String>) -> Self {
        let message: String = context.into();
        DrawError::StoreFatal(message.into())
    }
}

/// Errors from the notification sink. These never cross the draw boundary;
/// the engine logs and discards them.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The webhook request failed to complete (connect error or timeout).
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook returned status {status}")]
    Status { status: u16 },
}

/// Result type alias for draw operations.
pub type Result<T> = std::result::Result<T, DrawError>;

/// Result type alias for notification delivery.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
