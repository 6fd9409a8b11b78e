//! CV parsing HTTP surface — multipart PDF upload in, structured profile out.

use axum::{extract::Multipart, extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::models::cv::CandidateProfile;
use crate::resume::{parser, pdf};
use crate::state::AppState;

/// POST /v1/cv/parse
/// Accepts a multipart upload with a `file` field holding a PDF résumé.
pub async fn handle_parse_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CandidateProfile>, AppError> {
    let mut pdf_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::Validation("Only PDF supported".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        pdf_bytes = Some(bytes.to_vec());
        break;
    }

    let pdf_bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    let text = pdf::extract_text(&pdf_bytes)?;
    info!("Extracted {} chars of résumé text", text.len());

    let profile = parser::extract_profile(state.llm.as_ref(), &text).await?;
    Ok(Json(profile))
}
