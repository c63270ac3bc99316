//! PDF text extraction: every page's text, in page order, with nothing inserted between pages.

use super::ExtractionError;

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::ParseFailure(format!("Failed to extract text from PDF: {e}")))?;
    Ok(pages.concat())
}
