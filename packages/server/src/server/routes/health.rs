use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    storage: StorageHealth,
}

#[derive(Serialize)]
pub struct StorageHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool_size: Option<usize>,
}

/// Health check endpoint
///
/// Checks storage reachability with a bounded read of the pool key.
/// Returns 200 OK when the store answers, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.initializer.current(),
    )
    .await
    {
        Ok(Ok(pool)) => StorageHealth {
            status: "ok".to_string(),
            error: None,
            pool_size: Some(pool.map(|p| p.len()).unwrap_or(0)),
        },
        Ok(Err(e)) => StorageHealth {
            status: "error".to_string(),
            error: Some(format!("storage check failed: {e}")),
            pool_size: None,
        },
        Err(_) => StorageHealth {
            status: "error".to_string(),
            error: Some("storage check timeout (>5s)".to_string()),
            pool_size: None,
        },
    };

    let is_healthy = storage.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            storage,
        }),
    )
}
