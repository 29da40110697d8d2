use std::sync::Arc;

use crate::analysis::orchestrator::AnalysisOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the process-wide admission controller, extractor and model gateway.
    pub analyzer: Arc<AnalysisOrchestrator>,
}
