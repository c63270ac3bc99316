//! Text Extractor — turns an uploaded resume (PDF or DOCX) into plain text.
//!
//! Dispatch is on the declared file name only: a case-sensitive `.docx` / `.pdf` suffix.
//! Content is never sniffed, so a mislabeled file is rejected and a correctly labeled file
//! with garbage bytes is a `ParseFailure`.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Unsupported file type. Please upload a PDF or DOCX.";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Unsupported file type. Please upload a PDF or DOCX.")]
    UnsupportedType,

    #[error("{0}")]
    ParseFailure(String),
}

/// A file as received from the client. Consumed once by `extract`.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if file_name.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}

/// Synchronous extraction. CPU-bound; async callers should go through `extract`.
pub fn extract_blocking(document: &UploadedDocument) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_file_name(&document.file_name)
        .ok_or(ExtractionError::UnsupportedType)?;

    let text = match kind {
        DocumentKind::Docx => docx::extract_text(&document.bytes)?,
        DocumentKind::Pdf => pdf::extract_text(&document.bytes)?,
    };

    debug!(
        "Extracted {} chars from {:?} ({} bytes)",
        text.len(),
        kind,
        document.bytes.len()
    );
    Ok(text)
}

/// Extracts text on the blocking pool. A panic inside a parser library is reported as a
/// `ParseFailure` for this request only.
pub async fn extract(document: UploadedDocument) -> Result<String, ExtractionError> {
    // Reject before spawning so unsupported uploads never touch the blocking pool.
    if DocumentKind::from_file_name(&document.file_name).is_none() {
        return Err(ExtractionError::UnsupportedType);
    }

    tokio::task::spawn_blocking(move || extract_blocking(&document))
        .await
        .map_err(|e| ExtractionError::ParseFailure(format!("document parser crashed: {e}")))?
}
