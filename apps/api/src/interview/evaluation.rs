//! Evaluation Synthesizer — turns a finished transcript into a structured
//! report via a single delegated completion call with a fixed output shape.
//!
//! The synthesizer never fails the caller: delegate errors and malformed
//! output both collapse to a deterministic degraded report, because the
//! report endpoint must stay available even when the model misbehaves.

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_DISCIPLINE;
use crate::llm_client::{complete_json, ChatMessage, CompletionClient, CompletionOptions};
use crate::models::report::EvaluationReport;
use crate::models::session::Turn;

const EVALUATION_MAX_TOKENS: u32 = 1024;

const DEGRADED_SUMMARY: &str =
    "The evaluation service could not produce a detailed report for this session.";
const DEGRADED_MISSION: &str = "Keep practicing and try another session!";

/// Raw LLM output shape. Lists default so a sparse but otherwise valid
/// object still parses; the score is clamped after the fact.
#[derive(Debug, Deserialize)]
struct RawReport {
    score: i64,
    feedback_summary: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    areas_for_improvement: Vec<String>,
    mission: String,
}

fn evaluation_system() -> String {
    format!(
        "You are an experienced hiring coach evaluating a completed practice \
         interview. Score the candidate's performance and give concrete, \
         encouraging feedback. {JSON_ONLY_DISCIPLINE}"
    )
}

fn build_evaluation_prompt(transcript: &[Turn], job_position: &str) -> String {
    let transcript_text = transcript
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Below is the full transcript of a practice interview for the position \
         of {job_position}.\n\
         \n\
         TRANSCRIPT:\n\
         {transcript_text}\n\
         \n\
         Evaluate the candidate's answers. Return a JSON object with this EXACT \
         schema (no extra fields):\n\
         {{\n\
           \"score\": 75,\n\
           \"feedback_summary\": \"Two or three sentences summarizing the performance.\",\n\
           \"strengths\": [\"short bullet\", \"short bullet\"],\n\
           \"areas_for_improvement\": [\"short bullet\", \"short bullet\"],\n\
           \"mission\": \"One single actionable next step for the candidate.\"\n\
         }}\n\
         \n\
         Rules:\n\
         - score is an integer from 0 to 100.\n\
         - Base the evaluation ONLY on what the candidate actually said.\n\
         - mission must be one concrete action, not a list."
    )
}

/// The deterministic fallback report used when the delegate misbehaves.
pub fn degraded_report() -> EvaluationReport {
    EvaluationReport {
        score: 0,
        feedback_summary: DEGRADED_SUMMARY.to_string(),
        strengths: vec![],
        areas_for_improvement: vec![],
        mission: DEGRADED_MISSION.to_string(),
        voice_analysis: None,
    }
}

/// Synthesizes the evaluation report for a transcript. Infallible by design:
/// any delegate or parse failure degrades rather than propagating.
pub async fn synthesize(
    llm: &dyn CompletionClient,
    transcript: &[Turn],
    job_position: &str,
) -> EvaluationReport {
    let messages = [
        ChatMessage::system(evaluation_system()),
        ChatMessage::user(build_evaluation_prompt(transcript, job_position)),
    ];

    match complete_json::<RawReport>(llm, &messages, CompletionOptions::json(EVALUATION_MAX_TOKENS))
        .await
    {
        Ok(raw) => EvaluationReport {
            score: raw.score.clamp(0, 100) as u32,
            feedback_summary: raw.feedback_summary,
            strengths: raw.strengths,
            areas_for_improvement: raw.areas_for_improvement,
            mission: raw.mission,
            voice_analysis: None,
        },
        Err(e) => {
            warn!("Evaluation synthesis failed ({e}); returning degraded report");
            degraded_report()
        }
    }
}
