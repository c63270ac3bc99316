//! Axum route handler for the Analysis API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::analysis::cleaner::clean;
use crate::analysis::prompts::build_prompt;
use crate::errors::AppError;
use crate::extraction::{extract, UploadedDocument};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_result: String,
}

/// The two form fields the endpoint cares about. Anything else is ignored.
#[derive(Debug, Default)]
struct AnalysisForm {
    resume: Option<UploadedDocument>,
    job_description: Option<String>,
}

/// POST /analyze
///
/// Multipart form: `resume` (PDF or DOCX file) and `job_description` (text).
/// Pipeline: extract resume text → build prompt → model call → strip markdown.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let llm = state.llm.clone().ok_or(AppError::ModelUnavailable)?;

    let mut multipart = multipart.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let form = read_form(&mut multipart).await?;

    let resume = form
        .resume
        .ok_or_else(|| AppError::MissingInput("No resume file provided.".to_string()))?;
    let job_description = form
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::MissingInput("No job description provided.".to_string()))?;

    info!(
        "Analyzing resume '{}' ({} bytes) against a {}-char job description",
        resume.file_name,
        resume.bytes.len(),
        job_description.len()
    );

    let resume_text = extract(resume).await?;
    let prompt = build_prompt(&resume_text, &job_description);
    let raw = llm.generate(&prompt).await?;

    info!(
        "Analysis complete: {} chars extracted, {} chars returned",
        resume_text.len(),
        raw.len()
    );

    Ok(Json(AnalysisResponse {
        analysis_result: clean(&raw),
    }))
}

/// Reads the form. The first `resume` part carrying a file name wins; a `resume` part sent
/// as plain text (no file name) does not count as an uploaded file.
async fn read_form(multipart: &mut Multipart) -> Result<AnalysisForm, AppError> {
    let mut form = AnalysisForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" if form.resume.is_none() => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                form.resume = Some(UploadedDocument { file_name, bytes });
            }
            "job_description" if form.job_description.is_none() => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                form.job_description = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Body-limit overflows keep their 413; every other multipart fault is a malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large.".to_string())
    } else {
        AppError::InvalidRequest(err.body_text())
    }
}
