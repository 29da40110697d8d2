mod analysis;
mod config;
mod documents;
mod errors;
mod llm_client;
mod rate_limit;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::AnalysisOrchestrator;
use crate::config::Config;
use crate::documents::extract::PdfTextExtractor;
use crate::llm_client::{Endpoint, HttpModelGateway};
use crate::rate_limit::RateAdmissionController;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvfit API v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the model endpoint; a missing credential stops startup here
    let endpoint = Endpoint::from_config(&config)?;
    let gateway = HttpModelGateway::new(endpoint)?;
    info!("Model gateway initialized: {:?}", gateway);

    // One admission controller for the whole process
    let limiter = Arc::new(RateAdmissionController::new());

    let analyzer = AnalysisOrchestrator::new(limiter, Arc::new(PdfTextExtractor), Arc::new(gateway));

    // Build app state
    let state = AppState {
        analyzer: Arc::new(analyzer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
