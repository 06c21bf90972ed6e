use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booster_engine::{
    build_router,
    config::{Config, StorageBackend},
    directory::InMemoryActorDirectory,
    display::LoggingStatusDisplay,
    manager::BoosterManager,
    registry::BoosterTypeRegistry,
    repository::{BoosterStore, InMemoryBoosterStore, RedisBoosterStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with JSON formatting (configurable via env)
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string())
        .eq_ignore_ascii_case("json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "booster_engine=info,tower_http=info".into());

    if use_json {
        // JSON structured logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable logging for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        service = "booster-engine",
        version = env!("CARGO_PKG_VERSION"),
        log_format = if use_json { "json" } else { "text" },
        "Starting booster engine"
    );

    // Load configuration
    let config = Config::load()?;
    tracing::info!(storage = ?config.storage.backend, "Configuration loaded");

    // Install the recorder before anything records
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let store: Arc<dyn BoosterStore> = match config.storage.backend {
        StorageBackend::Redis => {
            let store = RedisBoosterStore::connect(&config.redis.url).await?;
            tracing::info!("Redis connected");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory booster storage; boosters are lost on restart");
            Arc::new(InMemoryBoosterStore::new())
        }
    };

    let directory = Arc::new(InMemoryActorDirectory::new());
    let manager = BoosterManager::builder(store, directory.clone())
        .settings(config.booster.clone())
        .registry(BoosterTypeRegistry::from_config(&config))
        .display(Arc::new(LoggingStatusDisplay))
        .build();
    manager.start().await;

    let app_state = AppState::new(config.clone(), manager.clone(), directory);
    let app = build_router(app_state);

    // Start metrics server
    let metrics_task = tokio::spawn(start_metrics_server(config.metrics_port, metrics_handle));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!("Booster engine API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.shutdown().await;
    metrics_task.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn start_metrics_server(port: u16, handle: PrometheusHandle) -> anyhow::Result<()> {
    let app = Router::new().route("/metrics", get(move || async move { handle.render() }));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Metrics server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
