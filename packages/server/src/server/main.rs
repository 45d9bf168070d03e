// Main entry point for the code draw API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{server::build_app, server::AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawpool::{
    KeyValueStore, MemoryStore, NotificationSink, NullSink, RedisStore, WebhookSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,drawpool=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting code draw API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(pool_key = %config.pool_key, num_extract = config.num_extract, "Configuration loaded");

    // Select the storage backend
    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Connecting to Redis...");
            Arc::new(RedisStore::new(url).context("Failed to create Redis client")?)
        }
        None => {
            tracing::warn!("REDIS_URL not set; using in-memory storage (development only)");
            Arc::new(MemoryStore::new())
        }
    };

    // Select the notification sink
    let sink: Arc<dyn NotificationSink> = match &config.webhook_url {
        Some(url) => {
            tracing::info!("Draw notifications will be posted to the configured webhook");
            Arc::new(WebhookSink::with_timeout(url.clone(), config.webhook_timeout))
        }
        None => {
            tracing::info!("WEBHOOK_URL not set; draw notifications disabled");
            Arc::new(NullSink)
        }
    };

    let state = AppState::new(store, sink, &config);
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Draw endpoint: http://localhost:{}/api/extract-codes", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
