//! CDR Screening Service - Main Entry Point
//!
//! Loads the screening classifiers, builds the HTTP router, and serves
//! prediction requests with full decision analysis.

use anyhow::Result;
use cdr_screening_service::{
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    models::inference::InferenceEngine,
    server::{create_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cdr_screening_service=info".parse()?),
        )
        .init();

    info!("Starting CDR Screening Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Initialize inference engine with ONNX models.
    // Built once here and injected through router state; no lazy globals.
    let engine = Arc::new(InferenceEngine::new(&config)?);
    info!(
        "Inference engine initialized with {} models: {:?}",
        engine.model_count(),
        engine.model_names()
    );

    // Start metrics reporter (prints periodic summaries)
    let metrics_clone = metrics.clone();
    let interval = config.logging.summary_interval_secs;
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, interval);
        reporter.start().await;
    });

    // Build router and serve
    let state = AppState::new(engine, metrics);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
