//! Interview HTTP surface — thin handlers over the orchestrator. All
//! sequencing, state, and failure handling lives in the orchestrator;
//! these only translate between wire bodies and orchestrator calls.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::orchestrator::InitInterview;
use crate::models::cv::CandidateProfile;
use crate::models::session::{InterviewerMode, VoiceBaseline, VoiceSample};
use crate::state::AppState;

fn default_mode() -> String {
    "social".to_string()
}

#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub cv_data: CandidateProfile,
    pub job_position: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default = "default_mode")]
    pub interviewer_mode: String,
    #[serde(default)]
    pub baseline_volume: Option<f64>,
    #[serde(default)]
    pub baseline_wpm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub session_id: Uuid,
    pub message: String,
}

/// POST /v1/interview/init
pub async fn handle_init(
    State(state): State<AppState>,
    Json(req): Json<InitRequest>,
) -> Result<Json<InitResponse>, AppError> {
    let baseline = match (req.baseline_volume, req.baseline_wpm) {
        (Some(volume), Some(wpm)) => Some(VoiceBaseline { volume, wpm }),
        _ => None,
    };

    let session_id = state
        .orchestrator
        .initialize(InitInterview {
            profile: req.cv_data,
            job_position: req.job_position,
            job_description: req.job_description,
            mode: InterviewerMode::parse(&req.interviewer_mode),
            baseline,
        })
        .await?;

    Ok(Json(InitResponse {
        session_id,
        message: "Interview session initialized successfully.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct NextRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    pub session_id: Uuid,
    pub interviewer_text: String,
}

/// POST /v1/interview/next — the next interviewer utterance with no new
/// user input (kicks off a phase, e.g. the opening greeting).
pub async fn handle_next(
    State(state): State<AppState>,
    Json(req): Json<NextRequest>,
) -> Result<Json<NextResponse>, AppError> {
    let interviewer_text = state.orchestrator.advance(req.session_id).await?;
    Ok(Json(NextResponse {
        session_id: req.session_id,
        interviewer_text,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub session_id: Uuid,
    pub user_text: String,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub wpm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub session_id: Uuid,
    pub interviewer_text: String,
}

/// POST /v1/interview/reply — the core turn operation.
pub async fn handle_reply(
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    // Delivery metrics are optional; a sample only exists when the client
    // measured something.
    let metrics = (req.volume.is_some() || req.pitch.is_some() || req.wpm.is_some()).then(|| {
        VoiceSample {
            volume: req.volume.unwrap_or(0.0),
            pitch: req.pitch.unwrap_or(0.0),
            wpm: req.wpm.unwrap_or(0.0),
        }
    });

    let interviewer_text = state
        .orchestrator
        .respond(req.session_id, &req.user_text, metrics)
        .await?;

    Ok(Json(ReplyResponse {
        session_id: req.session_id,
        interviewer_text,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EndRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EndResponse {
    pub session_id: Uuid,
    pub end_text: String,
    pub message: String,
}

/// POST /v1/interview/end
pub async fn handle_end(
    State(state): State<AppState>,
    Json(req): Json<EndRequest>,
) -> Result<Json<EndResponse>, AppError> {
    let end_text = state.orchestrator.end(req.session_id).await?;
    Ok(Json(EndResponse {
        session_id: req.session_id,
        end_text,
        message: "Interview session finished.".to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub session_id: Uuid,
    pub score: u32,
    pub feedback_summary: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub mission: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_analysis: Option<String>,
}

/// GET /v1/interview/report/:session_id
pub async fn handle_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = state.orchestrator.report(session_id).await?;
    Ok(Json(ReportResponse {
        session_id,
        score: report.score,
        feedback_summary: report.feedback_summary,
        strengths: report.strengths,
        areas_for_improvement: report.areas_for_improvement,
        mission: report.mission,
        voice_analysis: report.voice_analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_request_defaults_mode_to_social() {
        let json = serde_json::json!({
            "cv_data": {"name": "Ana", "skills": ["Go"]},
            "job_position": "Backend Engineer"
        });
        let req: InitRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.interviewer_mode, "social");
        assert!(req.baseline_volume.is_none());
    }

    #[test]
    fn test_reply_request_metrics_are_optional() {
        let json = serde_json::json!({
            "session_id": Uuid::new_v4(),
            "user_text": "Hello!"
        });
        let req: ReplyRequest = serde_json::from_value(json).unwrap();
        assert!(req.volume.is_none() && req.pitch.is_none() && req.wpm.is_none());
    }

    #[test]
    fn test_report_response_omits_absent_voice_analysis() {
        let response = ReportResponse {
            session_id: Uuid::new_v4(),
            score: 70,
            feedback_summary: "ok".to_string(),
            strengths: vec![],
            areas_for_improvement: vec![],
            mission: "m".to_string(),
            voice_analysis: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("voice_analysis").is_none());
    }
}
