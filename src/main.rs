//! Netwatch — real-time network anomaly telemetry server
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         NETWATCH                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐   ┌─────────────────────┐  │
//! │  │ WebSocket  │   │  Injection  │   │ Telemetry Producer  │  │
//! │  │ /ws/monitor│   │  endpoint   │   │  (periodic task)    │  │
//! │  └─────┬──────┘   └──────┬──────┘   └──────────┬──────────┘  │
//! │        │register         │broadcast            │broadcast    │
//! │        ▼                 ▼                     ▼             │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │        ConnectionRegistry (live observer set)         │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! │                                                              │
//! │  SampleSource (CSV dataset)      Predictor (ONNX model)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod broadcast;
mod config;
mod error;
mod handlers;
mod injector;
mod models;
mod predictor;
mod producer;
mod registry;
mod source;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::predictor::{OnnxPredictor, Predictor};
use crate::registry::ConnectionRegistry;
use crate::source::{CsvSampleSource, SampleSource};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: ConnectionRegistry,
    pub source: Arc<dyn SampleSource>,
    pub predictor: Arc<dyn Predictor>,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netwatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Netwatch server starting...");

    let source = CsvSampleSource::load(&config.dataset_path)
        .with_context(|| format!("failed to load dataset from {}", config.dataset_path))?;
    tracing::info!(
        normal = source.normal_count(),
        anomalous = source.anomaly_count(),
        "dataset loaded"
    );

    let predictor = OnnxPredictor::load(&config.model_path, &config.scaler_path)
        .with_context(|| format!("failed to load model from {}", config.model_path))?;

    let state = AppState {
        registry: ConnectionRegistry::new(),
        source: Arc::new(source),
        predictor: Arc::new(predictor),
        config: config.clone(),
    };

    // Background telemetry loop, runs until shutdown
    tokio::spawn(producer::run(state.clone()));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/ws/monitor", get(handlers::monitor::subscribe))
        .route("/introduce_anomaly", post(handlers::anomaly::introduce))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
