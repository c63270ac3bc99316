mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values, not on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    let llm = build_llm(&config)?;

    let state = AppState {
        llm,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!(
        "Listening on {addr} (CORS origin: {:?})",
        config.allowed_origin
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the model client. A missing key leaves the service up with analysis disabled.
fn build_llm(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        warn!("GEMINI_API_KEY is not set; /analyze will answer 500 until it is configured");
        return Ok(None);
    };

    let client = LlmClient::new(
        api_key,
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", client.model_name());

    Ok(Some(Arc::new(client)))
}
