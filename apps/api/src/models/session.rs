use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::cv::CandidateProfile;
use crate::models::report::EvaluationReport;

/// The four ordered stages of a scripted interview conversation.
///
/// The derived `Ord` follows declaration order, which is the only legal
/// direction of travel: a session never moves backward and never skips
/// a phase. `Closing` is terminal for phase purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Greeting,
    Introduction,
    Questions,
    Closing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Greeting => "GREETING",
            Phase::Introduction => "INTRODUCTION",
            Phase::Questions => "QUESTIONS",
            Phase::Closing => "CLOSING",
        }
    }

    /// Parses a classifier label. Tolerates surrounding whitespace and
    /// casing but nothing else — anything unrecognized is `None`.
    pub fn from_label(label: &str) -> Option<Phase> {
        match label.trim().to_ascii_uppercase().as_str() {
            "GREETING" => Some(Phase::Greeting),
            "INTRODUCTION" => Some(Phase::Introduction),
            "QUESTIONS" => Some(Phase::Questions),
            "CLOSING" => Some(Phase::Closing),
            _ => None,
        }
    }

    /// The phase that follows this one, or `None` from `Closing`.
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Greeting => Some(Phase::Introduction),
            Phase::Introduction => Some(Phase::Questions),
            Phase::Questions => Some(Phase::Closing),
            Phase::Closing => None,
        }
    }
}

/// Session lifecycle status. `Finished` is reached only through an explicit
/// end action; reaching the closing phase alone does not finish a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Init,
    Ongoing,
    Finished,
    Aborted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Init => "init",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Finished => "finished",
            SessionStatus::Aborted => "aborted",
        }
    }

    pub fn from_str(s: &str) -> Option<SessionStatus> {
        match s {
            "init" => Some(SessionStatus::Init),
            "ongoing" => Some(SessionStatus::Ongoing),
            "finished" => Some(SessionStatus::Finished),
            "aborted" => Some(SessionStatus::Aborted),
            _ => None,
        }
    }
}

/// Interviewer persona selector. Anything that is not `technical`
/// (e.g. `social`, `hr`) gets the HR recruiter framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewerMode {
    Technical,
    Social,
}

impl InterviewerMode {
    pub fn parse(s: &str) -> InterviewerMode {
        if s.eq_ignore_ascii_case("technical") {
            InterviewerMode::Technical
        } else {
            InterviewerMode::Social
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewerMode::Technical => "technical",
            InterviewerMode::Social => "social",
        }
    }
}

/// Role tag of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One message in a session transcript. Turns are totally ordered by
/// creation; the first turn of every session is the composed system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One per-turn speech-delivery sample reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSample {
    pub volume: f64,
    pub pitch: f64,
    pub wpm: f64,
}

/// Per-candidate calibration recorded at session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceBaseline {
    pub volume: f64,
    pub wpm: f64,
}

/// The unit of an interview attempt.
///
/// Owns its phase/counter state and (through the store) its transcript.
/// The candidate profile is referenced data: one profile may seed several
/// sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub profile: CandidateProfile,
    pub job_position: String,
    pub job_description: Option<String>,
    pub mode: InterviewerMode,
    pub phase: Phase,
    /// Completed assistant turns in the current phase. Resets to 0 on
    /// every committed phase transition.
    pub turn_count: u32,
    pub status: SessionStatus,
    pub baseline: Option<VoiceBaseline>,
    pub voice_samples: Vec<VoiceSample>,
    pub report: Option<EvaluationReport>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
