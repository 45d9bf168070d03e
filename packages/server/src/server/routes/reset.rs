//! Administrative restock endpoint.
//!
//! Overwrites the pool wholesale from a fresh CSV source, bypassing the
//! only-if-empty bootstrap guard. Used after exhaustion.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::routes::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ResetBody {
    pub csv_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub count: usize,
}

/// POST /api/reset-codes
pub async fn reset_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<ResetBody>>,
) -> Result<Json<ResetResponse>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let source = body
        .csv_content
        .or_else(|| state.csv_fallback.clone())
        .ok_or_else(|| {
            ApiError::bad_request("csv_content required in body or CSV_CONTENT in environment")
        })?;

    let count = state.initializer.reset(&source).await?;

    Ok(Json(ResetResponse {
        message: format!("loaded {count} codes into the pool"),
        count,
    }))
}
