//! Résumé parser — one JSON-mode completion call that turns extracted PDF
//! text into a structured `CandidateProfile`.

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_DISCIPLINE;
use crate::llm_client::{complete_json, ChatMessage, CompletionClient, CompletionOptions};
use crate::models::cv::CandidateProfile;

/// Résumés longer than this are truncated before the extraction call; the
/// head of a résumé carries virtually all of the structured signal.
const MAX_RESUME_CHARS: usize = 15_000;

const PARSE_MAX_TOKENS: u32 = 2048;

fn parser_system() -> String {
    format!("You are a resume parser. {JSON_ONLY_DISCIPLINE}")
}

/// Target schema, spelled out literally — the model matches this shape.
const PROFILE_SCHEMA: &str = r#"{
  "name": "Full Name",
  "email": "optional string or null",
  "phone": "optional string or null",
  "job_title": "optional string or null",
  "education": [
    {"degree": "B.Sc. Computer Science", "school": "Example University", "start": "2016", "end": "2020"}
  ],
  "experience": [
    {"title": "Backend Engineer", "company": "Example Corp", "start": "2020", "end": "2024", "bullets": ["short achievement"]}
  ],
  "projects": [
    {"name": "Project Name", "tech": ["Rust", "Postgres"], "bullets": ["what it does"]}
  ],
  "skills": ["Rust", "SQL"]
}"#;

fn build_parse_prompt(resume_text: &str) -> String {
    let truncated: String = resume_text.chars().take(MAX_RESUME_CHARS).collect();
    format!(
        "Extract CV data from this text:\n{truncated}\n\n\
         Match this JSON schema exactly (use null or empty lists for missing data):\n\
         {PROFILE_SCHEMA}"
    )
}

/// Parses résumé text into a structured profile. Unlike the interview-turn
/// path there is no sensible fallback here, so delegate failures surface.
pub async fn extract_profile(
    llm: &dyn CompletionClient,
    resume_text: &str,
) -> Result<CandidateProfile, AppError> {
    let messages = [
        ChatMessage::system(parser_system()),
        ChatMessage::user(build_parse_prompt(resume_text)),
    ];

    complete_json::<CandidateProfile>(llm, &messages, CompletionOptions::json(PARSE_MAX_TOKENS))
        .await
        .map_err(|e| AppError::Llm(format!("Résumé parsing failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;

    struct FixedReply(&'static str);

    #[async_trait]
    impl CompletionClient for FixedReply {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _opts: CompletionOptions,
        ) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_prompt_truncates_oversized_resumes() {
        let huge = "x".repeat(MAX_RESUME_CHARS * 2);
        let prompt = build_parse_prompt(&huge);
        // Prompt holds the truncated text plus the fixed schema scaffold.
        assert!(prompt.len() < MAX_RESUME_CHARS + PROFILE_SCHEMA.len() + 256);
    }

    #[test]
    fn test_prompt_carries_the_schema() {
        let prompt = build_parse_prompt("Jane Doe, backend developer since 2019.");
        assert!(prompt.contains("\"skills\""));
        assert!(prompt.contains("\"experience\""));
        assert!(prompt.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_partial_extraction_parses_with_defaults() {
        let llm = FixedReply(r#"{"name": "Jane Doe", "skills": ["Rust"]}"#);
        let profile = extract_profile(&llm, "Jane Doe. Rust developer.").await.unwrap();
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.skills, vec!["Rust".to_string()]);
        assert!(profile.education.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_output_surfaces_as_llm_error() {
        let llm = FixedReply("Jane seems like a nice person.");
        let result = extract_profile(&llm, "whatever").await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
