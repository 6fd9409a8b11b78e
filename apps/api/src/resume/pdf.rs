//! Résumé PDF text extraction.

use crate::errors::AppError;

/// Extracted text shorter than this is treated as an empty or scanned
/// document — there is nothing meaningful for the profile extractor.
pub const MIN_TEXT_LEN: usize = 50;

/// Extracts the plain text of an uploaded PDF. Rejects documents that do
/// not decode or yield (almost) no text; OCR is out of scope.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    let text = text.trim().to_string();
    if text.len() < MIN_TEXT_LEN {
        return Err(AppError::Validation(
            "Empty or scanned PDF — no extractable text".to_string(),
        ));
    }
    Ok(text)
}
