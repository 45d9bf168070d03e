//! Handler-level tests on top of the in-memory store and spy sink.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use drawpool::testing::SpySink;
use drawpool::{KeyValueStore, LockCoordinator, MemoryStore};
use server_core::server::routes::{
    extract_get_handler, extract_post_handler, health_handler, reset_handler, ExtractBody,
    ResetBody,
};
use server_core::server::AppState;
use server_core::Config;

fn test_config() -> Config {
    Config {
        redis_url: None,
        port: 0,
        pool_key: "codes".to_string(),
        num_extract: 3,
        lock_ttl: Duration::from_secs(8),
        webhook_url: None,
        webhook_timeout: Duration::from_secs(5),
        csv_content: None,
    }
}

fn state_with(store: Arc<dyn KeyValueStore>, sink: Arc<SpySink>) -> AppState {
    AppState::new(store, sink, &test_config())
}

#[tokio::test]
async fn extract_on_empty_pool_reports_no_codes() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = state_with(store, Arc::new(SpySink::new()));

    let Json(response) = extract_post_handler(Extension(state), None).await.unwrap();
    assert!(response.extracted.is_empty());
    assert_eq!(response.remaining, 0);
    assert_eq!(response.message, "no codes available");
}

#[tokio::test]
async fn extract_seeds_from_request_body_and_draws() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let sink = Arc::new(SpySink::new());
    let state = state_with(store, sink.clone());

    let body = ExtractBody {
        csv_content: Some("A,B,C\nD,E".to_string()),
        send_webhook: None,
    };
    let Json(response) = extract_post_handler(Extension(state), Some(Json(body)))
        .await
        .unwrap();

    assert_eq!(response.extracted.len(), 3);
    assert_eq!(response.remaining, 2);
    assert_eq!(response.message, "extracted 3 codes");
    assert_eq!(sink.sent_count(), 1);
}

#[tokio::test]
async fn extract_get_never_notifies() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("codes", json!(["A", "B"])).await.unwrap();
    let sink = Arc::new(SpySink::new());
    let state = state_with(store, sink.clone());

    let Json(response) = extract_get_handler(Extension(state)).await.unwrap();
    assert_eq!(response.extracted.len(), 2);
    assert_eq!(sink.sent_count(), 0);
}

#[tokio::test]
async fn extract_respects_webhook_opt_out() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("codes", json!(["A", "B"])).await.unwrap();
    let sink = Arc::new(SpySink::new());
    let state = state_with(store, sink.clone());

    let body = ExtractBody {
        csv_content: None,
        send_webhook: Some(false),
    };
    extract_post_handler(Extension(state), Some(Json(body)))
        .await
        .unwrap();
    assert_eq!(sink.sent_count(), 0);
}

#[tokio::test]
async fn contended_draw_maps_to_service_unavailable() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("codes", json!(["A"])).await.unwrap();

    let lock = LockCoordinator::new(store.clone());
    assert!(lock.acquire("codes", Duration::from_secs(8)).await.unwrap());

    let state = state_with(store, Arc::new(SpySink::new()));
    let err = extract_post_handler(Extension(state), None)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn reset_requires_a_source() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = state_with(store, Arc::new(SpySink::new()));

    let err = reset_handler(Extension(state), None).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_overwrites_a_depleted_pool() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("codes", json!([])).await.unwrap();
    let state = state_with(store.clone(), Arc::new(SpySink::new()));

    let body = ResetBody {
        csv_content: Some("X,Y,Z".to_string()),
    };
    let Json(response) = reset_handler(Extension(state), Some(Json(body)))
        .await
        .unwrap();

    assert_eq!(response.count, 3);
    let pool: Vec<String> =
        serde_json::from_value(store.get("codes").await.unwrap().unwrap()).unwrap();
    assert_eq!(pool, vec!["X", "Y", "Z"]);
}

#[tokio::test]
async fn reset_rejects_a_blank_source() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = state_with(store, Arc::new(SpySink::new()));

    let body = ResetBody {
        csv_content: Some(" , ,\n".to_string()),
    };
    let err = reset_handler(Extension(state), Some(Json(body)))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_pool_size() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set("codes", json!(["A", "B"])).await.unwrap();
    let state = state_with(store, Arc::new(SpySink::new()));

    let (status, _body) = health_handler(Extension(state)).await;
    assert_eq!(status, StatusCode::OK);
}
