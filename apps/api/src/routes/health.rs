use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and whether a model is configured. Never calls the model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model = state.llm.as_ref().map(|llm| llm.model_name().to_string());
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer",
        "model_configured": model.is_some(),
        "model": model,
    }))
}
