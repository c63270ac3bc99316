use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

const DEFAULT_ALLOWED_ORIGIN: &str = "https://theresumeanalyzer.netlify.app";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// A missing `GEMINI_API_KEY` is not a startup error: the service still boots
/// and every analysis request is answered with a model-unavailable error.
/// Malformed values (port, origin, sizes) fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    /// The only browser origin allowed to call `/analyze`.
    pub allowed_origin: HeaderValue,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let allowed_origin = optional_env("ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            allowed_origin: HeaderValue::from_str(&allowed_origin)
                .with_context(|| format!("ALLOWED_ORIGIN '{allowed_origin}' is not a valid header value"))?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank values the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
