//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use drawpool::{
    EngineConfig, ExtractionEngine, KeyValueStore, NotificationSink, PoolInitializer,
};

use crate::config::Config;
use crate::server::routes::{
    extract_get_handler, extract_post_handler, health_handler, reset_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ExtractionEngine>,
    pub initializer: Arc<PoolInitializer>,
    pub store: Arc<dyn KeyValueStore>,
    pub num_extract: usize,
    pub csv_fallback: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn NotificationSink>,
        config: &Config,
    ) -> Self {
        let engine = ExtractionEngine::new(
            store.clone(),
            sink,
            EngineConfig {
                pool_key: config.pool_key.clone(),
                lock_ttl: config.lock_ttl,
            },
        );
        let initializer = PoolInitializer::new(store.clone(), config.pool_key.clone());
        Self {
            engine: Arc::new(engine),
            initializer: Arc::new(initializer),
            store,
            num_extract: config.num_extract,
            csv_fallback: config.csv_content.clone(),
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // The original deployment served a browser UI from another origin, so
    // CORS stays permissive.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/extract-codes",
            post(extract_post_handler).get(extract_get_handler),
        )
        .route("/api/reset-codes", post(reset_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
