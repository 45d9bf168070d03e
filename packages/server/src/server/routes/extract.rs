//! The draw trigger endpoint.
//!
//! POST draws and notifies the webhook (unless the body opts out); GET is a
//! read-only trigger that never notifies, matching the original service.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use drawpool::DrawRequest;

use crate::server::app::AppState;
use crate::server::routes::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ExtractBody {
    /// Raw CSV to seed the pool from when it is absent or empty.
    pub csv_content: Option<String>,
    /// Set to `false` to suppress the webhook for this draw.
    pub send_webhook: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub extracted: Vec<String>,
    pub remaining: usize,
    pub message: String,
}

async fn run_draw(
    state: &AppState,
    body: ExtractBody,
    notify: bool,
) -> Result<Json<ExtractResponse>, ApiError> {
    let seed = body.csv_content.or_else(|| state.csv_fallback.clone());

    let mut request = DrawRequest::new(state.num_extract);
    if let Some(source) = seed.as_deref() {
        request = request.with_seed(source);
    }
    if !notify || body.send_webhook == Some(false) {
        request = request.silent();
    }

    let outcome = state.engine.extract(request).await?;

    let message = if outcome.is_empty() {
        "no codes available".to_string()
    } else {
        format!("extracted {} codes", outcome.selected.len())
    };

    Ok(Json(ExtractResponse {
        extracted: outcome.selected,
        remaining: outcome.remaining,
        message,
    }))
}

/// POST /api/extract-codes
pub async fn extract_post_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<ExtractBody>>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    run_draw(&state, body, true).await
}

/// GET /api/extract-codes (no webhook dispatch)
pub async fn extract_get_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ExtractResponse>, ApiError> {
    run_draw(&state, ExtractBody::default(), false).await
}
