//! Draw-error to HTTP-status mapping.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use drawpool::DrawError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level error: a status plus a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DrawError> for ApiError {
    fn from(err: DrawError) -> Self {
        match err {
            // 503 tells an automated retrier (e.g. a webhook platform) to
            // back off and try again; these are not hard failures.
            DrawError::Contended => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "extraction in progress, retry shortly".to_string(),
            },
            DrawError::StoreUnavailable(_) => {
                tracing::warn!(error = %err, "storage temporarily unavailable");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "storage temporarily unavailable, retry shortly".to_string(),
                }
            }
            DrawError::InvalidSource { ref reason } => Self {
                status: StatusCode::BAD_REQUEST,
                message: reason.clone(),
            },
            DrawError::StoreFatal(_) => {
                tracing::error!(error = %err, "storage failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "storage failure".to_string(),
                }
            }
        }
    }
}
