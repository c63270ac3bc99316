use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here needs locking.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key was configured. Analysis requests then fail fast with
    /// `AppError::ModelUnavailable` instead of running the pipeline.
    pub llm: Option<Arc<dyn TextGenerator>>,
    pub config: Config,
}
