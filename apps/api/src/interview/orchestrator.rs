//! Interview Orchestrator — the only component allowed to sequence a full
//! interview turn.
//!
//! Flow per `respond`: transition decision → append user turn → compose
//! prompt → completion call → append assistant turn → bump the per-phase
//! counter. Delegate failures degrade to fallback utterances so a single
//! bad LLM call never breaks the interview; store failures propagate.
//!
//! Concurrent calls against the same session id are serialized through a
//! keyed mutex — the phase/counter mutation and the transcript append are
//! separate store calls, and a racing second turn could otherwise classify
//! against a stale phase or double-increment the counter. Sessions are
//! fully independent of each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::evaluation;
use crate::interview::phase::{decide_transition, PhaseCaps};
use crate::interview::prompts::compose;
use crate::interview::voice;
use crate::llm_client::{ChatMessage, CompletionClient, CompletionOptions};
use crate::models::cv::CandidateProfile;
use crate::models::report::EvaluationReport;
use crate::models::session::{
    InterviewerMode, Phase, Role, Session, SessionStatus, Turn, VoiceBaseline, VoiceSample,
};
use crate::store::{SessionStateUpdate, SessionStore};

/// Generic acknowledgment used when the completion collaborator fails
/// mid-interview. Spoken register, no structure, keeps the session moving.
const FALLBACK_REPLY: &str = "I see, thank you for sharing that. Let's keep going. \
     Could you tell me a little more about that?";

/// Closing remark used when the completion collaborator fails during `end`.
const FALLBACK_CLOSING: &str = "Thank you so much for your time today. The team will review \
     your interview and be in touch soon. Goodbye!";

const REPLY_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.7,
    max_tokens: 256,
    want_json: false,
};

/// Everything needed to start a session. The profile comes from the résumé
/// parser; the baseline is an optional voice calibration.
#[derive(Debug, Clone)]
pub struct InitInterview {
    pub profile: CandidateProfile,
    pub job_position: String,
    pub job_description: Option<String>,
    pub mode: InterviewerMode,
    pub baseline: Option<VoiceBaseline>,
}

pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    llm: Arc<dyn CompletionClient>,
    caps: PhaseCaps,
    /// Per-session serialization. Entries are created on demand and live for
    /// the process lifetime; sessions are short-lived enough that this map
    /// stays small.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        llm: Arc<dyn CompletionClient>,
        caps: PhaseCaps,
    ) -> Self {
        Self {
            store,
            llm,
            caps,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn session_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    async fn load(&self, id: Uuid) -> Result<Session, AppError> {
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Creates a session in the greeting phase and records the composed
    /// interviewer persona as the first (system) turn.
    pub async fn initialize(&self, init: InitInterview) -> Result<Uuid, AppError> {
        if init.profile.is_empty() {
            return Err(AppError::Validation(
                "Candidate profile is missing or empty".to_string(),
            ));
        }
        if init.job_position.trim().is_empty() {
            return Err(AppError::Validation(
                "Job position must not be empty".to_string(),
            ));
        }

        let session = Session {
            id: Uuid::new_v4(),
            profile: init.profile,
            job_position: init.job_position,
            job_description: init.job_description,
            mode: init.mode,
            phase: Phase::Greeting,
            turn_count: 0,
            status: SessionStatus::Init,
            baseline: init.baseline,
            voice_samples: vec![],
            report: None,
            started_at: Utc::now(),
            ended_at: None,
        };

        let system_prompt = compose(
            session.phase,
            session.mode,
            &session.profile,
            &session.job_position,
            session.turn_count,
            self.caps.questions,
        );

        self.store.create_session(&session).await?;
        self.store
            .append_turn(&Turn {
                session_id: session.id,
                role: Role::System,
                content: system_prompt,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            "Initialized interview session {} ({} mode, position: {})",
            session.id,
            session.mode.as_str(),
            session.job_position
        );
        Ok(session.id)
    }

    /// Produces the next interviewer utterance with no new user input.
    /// Used to kick off a phase, e.g. the opening greeting.
    pub async fn advance(&self, session_id: Uuid) -> Result<String, AppError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load(session_id).await?;
        ensure_not_finished(&session)?;
        let transcript = self.store.list_turns(session_id).await?;

        let text = self
            .generate_reply(&session, session.phase, session.turn_count, &transcript)
            .await;

        self.append_assistant_turn(&session, session.phase, session.turn_count, &text)
            .await?;
        Ok(text)
    }

    /// The core sequencing operation: runs the transition decision, records
    /// the user turn, generates and records the interviewer's reply.
    pub async fn respond(
        &self,
        session_id: Uuid,
        user_text: &str,
        voice_metrics: Option<VoiceSample>,
    ) -> Result<String, AppError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load(session_id).await?;
        ensure_not_finished(&session)?;
        let transcript = self.store.list_turns(session_id).await?;

        // Transition decision happens before the reply is generated, against
        // the transcript as it stood when the user spoke.
        let target = decide_transition(
            self.llm.as_ref(),
            session.phase,
            session.turn_count,
            self.caps,
            &transcript,
            user_text,
        )
        .await;

        let (phase, turn_count) = if target != session.phase {
            info!(
                "Session {session_id}: phase {} -> {}",
                session.phase.as_str(),
                target.as_str()
            );
            (target, 0)
        } else {
            (session.phase, session.turn_count)
        };

        self.store
            .append_turn(&Turn {
                session_id,
                role: Role::User,
                content: user_text.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        if let Some(sample) = voice_metrics {
            self.store.record_voice_sample(session_id, sample).await?;
        }

        let mut context = transcript;
        context.push(Turn {
            session_id,
            role: Role::User,
            content: user_text.to_string(),
            created_at: Utc::now(),
        });

        let text = self.generate_reply(&session, phase, turn_count, &context).await;

        self.append_assistant_turn(&session, phase, turn_count, &text)
            .await?;
        Ok(text)
    }

    /// Generates a closing remark and finishes the session. Idempotent:
    /// ending an already-finished session returns the stored closing text
    /// and appends nothing.
    pub async fn end(&self, session_id: Uuid) -> Result<String, AppError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load(session_id).await?;

        if session.status == SessionStatus::Finished {
            let transcript = self.store.list_turns(session_id).await?;
            let closing = transcript
                .iter()
                .rev()
                .find(|t| t.role == Role::Assistant)
                .map(|t| t.content.clone())
                .unwrap_or_else(|| FALLBACK_CLOSING.to_string());
            return Ok(closing);
        }

        let transcript = self.store.list_turns(session_id).await?;
        let prompt = compose(
            Phase::Closing,
            session.mode,
            &session.profile,
            &session.job_position,
            0,
            self.caps.questions,
        );
        let messages = build_messages(prompt, &transcript);

        let text = match self.llm.complete(&messages, REPLY_OPTIONS).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Closing completion failed for session {session_id} ({e}); using fallback");
                FALLBACK_CLOSING.to_string()
            }
        };

        self.store
            .append_turn(&Turn {
                session_id,
                role: Role::Assistant,
                content: text.clone(),
                created_at: Utc::now(),
            })
            .await?;

        // Finalization only flips the status; the phase stays where the
        // classifier left it, so the observed sequence never skips.
        self.store
            .update_session_state(
                session_id,
                SessionStateUpdate {
                    status: SessionStatus::Finished,
                    ended_at: Some(Utc::now()),
                    ..SessionStateUpdate::from_session(&session)
                },
            )
            .await?;

        info!("Session {session_id} finished");
        Ok(text)
    }

    /// Synthesizes the evaluation report for a session. Requires a non-empty
    /// transcript; performs no delegate call otherwise.
    pub async fn report(&self, session_id: Uuid) -> Result<EvaluationReport, AppError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load(session_id).await?;
        let transcript = self.store.list_turns(session_id).await?;

        if transcript.is_empty() {
            return Err(AppError::Validation(
                "No interview history found to analyze".to_string(),
            ));
        }

        let mut report =
            evaluation::synthesize(self.llm.as_ref(), &transcript, &session.job_position).await;

        if let Some(baseline) = session.baseline {
            report.voice_analysis = voice::analyze(&session.voice_samples, baseline);
        }

        self.store.store_report(session_id, &report).await?;
        Ok(report)
    }

    /// Composes the phase prompt and asks the completion collaborator for
    /// the next interviewer utterance, degrading to the fallback reply.
    async fn generate_reply(
        &self,
        session: &Session,
        phase: Phase,
        turn_count: u32,
        transcript: &[Turn],
    ) -> String {
        let prompt = compose(
            phase,
            session.mode,
            &session.profile,
            &session.job_position,
            turn_count,
            self.caps.questions,
        );
        let messages = build_messages(prompt, transcript);

        match self.llm.complete(&messages, REPLY_OPTIONS).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Completion failed for session {} ({e}); using fallback reply",
                    session.id
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Records the assistant turn, bumps the per-phase counter, and commits
    /// phase/counter/status durably before returning.
    async fn append_assistant_turn(
        &self,
        session: &Session,
        phase: Phase,
        turn_count: u32,
        text: &str,
    ) -> Result<(), AppError> {
        self.store
            .append_turn(&Turn {
                session_id: session.id,
                role: Role::Assistant,
                content: text.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        self.store
            .update_session_state(
                session.id,
                SessionStateUpdate {
                    phase,
                    turn_count: turn_count + 1,
                    status: SessionStatus::Ongoing,
                    ended_at: session.ended_at,
                },
            )
            .await
    }
}

/// Finished sessions are read-only; only `end` (idempotent) and `report`
/// accept them.
fn ensure_not_finished(session: &Session) -> Result<(), AppError> {
    if session.status == SessionStatus::Finished {
        return Err(AppError::Validation(format!(
            "Session {} is already finished",
            session.id
        )));
    }
    Ok(())
}

/// The controlling context for the next utterance: the freshly composed
/// phase prompt, then the conversation so far. Historic system turns are
/// dropped — each turn carries exactly one, current, system prompt.
fn build_messages(system_prompt: String, transcript: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    messages.extend(transcript.iter().filter_map(|t| match t.role {
        Role::System => None,
        Role::User => Some(ChatMessage::user(t.content.clone())),
        Role::Assistant => Some(ChatMessage::assistant(t.content.clone())),
    }));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completion double that replays a script. `None` entries fail the
    /// call; an exhausted script repeats the last entry.
    struct ScriptedLlm {
        script: Mutex<VecDeque<Option<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new<const N: usize>(script: [Option<&str>; N]) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().map(|s| s.map(str::to_string)).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn always(reply: &str) -> Arc<Self> {
            Self::new([Some(reply)])
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _opts: CompletionOptions,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().await;
            let entry = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().flatten()
            };
            entry.ok_or(LlmError::EmptyContent)
        }
    }

    fn ana() -> CandidateProfile {
        CandidateProfile {
            name: "Ana".to_string(),
            skills: vec!["Go".to_string(), "SQL".to_string()],
            ..Default::default()
        }
    }

    fn init_request() -> InitInterview {
        InitInterview {
            profile: ana(),
            job_position: "Backend Engineer".to_string(),
            job_description: None,
            mode: InterviewerMode::Technical,
            baseline: None,
        }
    }

    fn orchestrator(llm: Arc<ScriptedLlm>) -> (Orchestrator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let orch = Orchestrator::new(store.clone(), llm, PhaseCaps::with_max_questions(4));
        (orch, store)
    }

    #[tokio::test]
    async fn test_initialize_creates_greeting_session_with_system_turn() {
        let llm = ScriptedLlm::always("unused");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Greeting);
        assert_eq!(session.turn_count, 0);
        assert_eq!(session.status, SessionStatus::Init);

        let turns = store.list_turns(id).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::System);
        assert!(turns[0].content.contains("Backend Engineer"));
        assert!(turns[0].content.contains("Senior Technical Lead"));
    }

    #[tokio::test]
    async fn test_initialize_rejects_empty_profile() {
        let llm = ScriptedLlm::always("unused");
        let (orch, _) = orchestrator(llm);

        let result = orch
            .initialize(InitInterview {
                profile: CandidateProfile::default(),
                ..init_request()
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_initialize_rejects_blank_job_position() {
        let llm = ScriptedLlm::always("unused");
        let (orch, _) = orchestrator(llm);

        let result = orch
            .initialize(InitInterview {
                job_position: "   ".to_string(),
                ..init_request()
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_advance_on_unknown_session_is_not_found() {
        let llm = ScriptedLlm::always("hello");
        let (orch, _) = orchestrator(llm);

        let result = orch.advance(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_advance_appends_assistant_turn_and_bumps_counter() {
        let llm = ScriptedLlm::always("Welcome to the interview, Ana!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let text = orch.advance(id).await.unwrap();
        assert_eq!(text, "Welcome to the interview, Ana!");

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Greeting);
        assert_eq!(session.turn_count, 1);
        assert_eq!(session.status, SessionStatus::Ongoing);

        let turns = store.list_turns(id).await.unwrap();
        assert_eq!(turns.last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_respond_appends_user_then_assistant_exactly_once() {
        // Classifier answers first (stay), then the reply.
        let llm = ScriptedLlm::new([Some("GREETING"), Some("Nice to meet you!")]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let text = orch.respond(id, "Hi there!", None).await.unwrap();
        assert_eq!(text, "Nice to meet you!");

        let turns = store.list_turns(id).await.unwrap();
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(turns[1].content, "Hi there!");
    }

    #[tokio::test]
    async fn test_respond_degrades_to_fallback_when_completion_fails() {
        // Classifier stays, then the reply call fails, and keeps failing.
        let llm = ScriptedLlm::new([Some("GREETING"), None]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let text = orch.respond(id, "Hello!", None).await.unwrap();
        assert_eq!(text, FALLBACK_REPLY);

        // The turn pair is still fully recorded: one user, one assistant.
        let turns = store.list_turns(id).await.unwrap();
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(turns[2].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_respond_commits_forward_transition_and_resets_counter() {
        let llm = ScriptedLlm::new([Some("INTRODUCTION"), Some("Tell me about yourself.")]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        orch.respond(id, "Hi, ready when you are.", None).await.unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Introduction);
        // Reset to 0 on commit, then one completed assistant turn.
        assert_eq!(session.turn_count, 1);
    }

    #[tokio::test]
    async fn test_unrecognized_classifier_label_never_changes_phase() {
        let llm = ScriptedLlm::new([Some("MOVE ALONG PLEASE"), Some("And your experience?")]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        orch.respond(id, "Hello!", None).await.unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Greeting);
    }

    #[tokio::test]
    async fn test_questions_cap_forces_closing() {
        let llm = ScriptedLlm::new([Some("QUESTIONS"), Some("Question four."), Some("Goodbye!")]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        // Put the session at question 3 of 4 directly through the store.
        store
            .update_session_state(
                id,
                SessionStateUpdate {
                    phase: Phase::Questions,
                    turn_count: 3,
                    status: SessionStatus::Ongoing,
                    ended_at: None,
                },
            )
            .await
            .unwrap();

        // Below cap: classifier says stay, counter reaches the cap.
        orch.respond(id, "Here is my answer.", None).await.unwrap();
        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Questions);
        assert_eq!(session.turn_count, 4);

        // At cap: the transition is forced without consulting the classifier.
        orch.respond(id, "And another thought.", None).await.unwrap();
        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Closing);
        assert_eq!(session.turn_count, 1);
    }

    #[tokio::test]
    async fn test_phases_observed_over_time_are_non_decreasing() {
        let llm = ScriptedLlm::new([
            Some("INTRODUCTION"),
            Some("Tell me about your background."),
            Some("GREETING"), // illegal backward verdict, must be discarded
            Some("What drew you to this role?"),
        ]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let mut observed = vec![store.get_session(id).await.unwrap().unwrap().phase];

        orch.respond(id, "Hi!", None).await.unwrap();
        observed.push(store.get_session(id).await.unwrap().unwrap().phase);

        orch.respond(id, "I'm a backend developer.", None).await.unwrap();
        observed.push(store.get_session(id).await.unwrap().unwrap().phase);

        assert!(observed.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(observed.last(), Some(&Phase::Introduction));
    }

    #[tokio::test]
    async fn test_end_finishes_session_and_appends_closing_turn() {
        let llm = ScriptedLlm::always("Thanks for coming in, Ana. Goodbye!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let text = orch.end(id).await.unwrap();
        assert_eq!(text, "Thanks for coming in, Ana. Goodbye!");

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Finished);
        assert_eq!(session.phase, Phase::Greeting);
        assert!(session.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_end_preserves_the_current_phase() {
        let llm = ScriptedLlm::always("Best of luck, Ana!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        store
            .update_session_state(
                id,
                SessionStateUpdate {
                    phase: Phase::Questions,
                    turn_count: 2,
                    status: SessionStatus::Ongoing,
                    ended_at: None,
                },
            )
            .await
            .unwrap();

        orch.end(id).await.unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.phase, Phase::Questions);
        assert_eq!(session.status, SessionStatus::Finished);
    }

    #[tokio::test]
    async fn test_end_twice_is_idempotent() {
        let llm = ScriptedLlm::always("Goodbye, and good luck!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let first = orch.end(id).await.unwrap();
        let turns_after_first = store.list_turns(id).await.unwrap().len();

        let second = orch.end(id).await.unwrap();
        let turns_after_second = store.list_turns(id).await.unwrap().len();

        assert_eq!(first, second);
        assert_eq!(turns_after_first, turns_after_second);
    }

    #[tokio::test]
    async fn test_respond_after_end_keeps_session_finished() {
        let llm = ScriptedLlm::always("Goodbye!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        orch.end(id).await.unwrap();
        let turns_before = store.list_turns(id).await.unwrap().len();

        let result = orch.respond(id, "Wait, one more thing!", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Finished);
        assert_eq!(store.list_turns(id).await.unwrap().len(), turns_before);
    }

    #[tokio::test]
    async fn test_advance_after_end_is_rejected() {
        let llm = ScriptedLlm::always("Goodbye!");
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        orch.end(id).await.unwrap();

        let result = orch.advance(id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Finished);
    }

    #[tokio::test]
    async fn test_end_uses_fallback_when_completion_fails() {
        let llm = ScriptedLlm::new([None]);
        let (orch, store) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        let text = orch.end(id).await.unwrap();
        assert_eq!(text, FALLBACK_CLOSING);

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Finished);
    }

    #[tokio::test]
    async fn test_report_on_empty_transcript_fails_without_delegate_call() {
        let llm = ScriptedLlm::always(r#"{"score": 90, "feedback_summary": "x", "mission": "y"}"#);
        let (orch, store) = orchestrator(llm.clone());

        // A session created directly in the store, with no turns at all.
        let session = Session {
            id: Uuid::new_v4(),
            profile: ana(),
            job_position: "Backend Engineer".to_string(),
            job_description: None,
            mode: InterviewerMode::Technical,
            phase: Phase::Greeting,
            turn_count: 0,
            status: SessionStatus::Init,
            baseline: None,
            voice_samples: vec![],
            report: None,
            started_at: Utc::now(),
            ended_at: None,
        };
        store.create_session(&session).await.unwrap();

        let result = orch.report(session.id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_merges_voice_commentary_when_baseline_present() {
        let llm = ScriptedLlm::new([
            Some("GREETING"),
            Some("Good to hear."),
            Some(r#"{"score": 70, "feedback_summary": "solid", "mission": "practice"}"#),
        ]);
        let (orch, store) = orchestrator(llm);

        let id = orch
            .initialize(InitInterview {
                baseline: Some(VoiceBaseline {
                    volume: 0.5,
                    wpm: 130.0,
                }),
                ..init_request()
            })
            .await
            .unwrap();

        // Three fast-talking turns against the 130 wpm baseline.
        orch.respond(
            id,
            "Let me tell you everything at once!",
            Some(VoiceSample {
                volume: 0.5,
                pitch: 220.0,
                wpm: 180.0,
            }),
        )
        .await
        .unwrap();

        let report = orch.report(id).await.unwrap();
        assert_eq!(report.score, 70);
        let voice = report.voice_analysis.expect("voice commentary expected");
        assert!(voice.contains("much faster"));

        // The report is cached on the session row.
        let session = store.get_session(id).await.unwrap().unwrap();
        assert!(session.report.is_some());
    }

    #[tokio::test]
    async fn test_report_without_baseline_has_no_voice_commentary() {
        let llm = ScriptedLlm::new([
            Some("GREETING"),
            Some("Noted."),
            Some(r#"{"score": 55, "feedback_summary": "fine", "mission": "m"}"#),
        ]);
        let (orch, _) = orchestrator(llm);

        let id = orch.initialize(init_request()).await.unwrap();
        orch.respond(id, "Hello!", None).await.unwrap();

        let report = orch.report(id).await.unwrap();
        assert!(report.voice_analysis.is_none());
    }

    #[tokio::test]
    async fn test_voice_sample_recorded_during_respond() {
        let llm = ScriptedLlm::new([Some("GREETING"), Some("Thanks.")]);
        let (orch, store) = orchestrator(llm);

        let id = orch
            .initialize(InitInterview {
                baseline: Some(VoiceBaseline {
                    volume: 0.5,
                    wpm: 130.0,
                }),
                ..init_request()
            })
            .await
            .unwrap();

        orch.respond(
            id,
            "Hi!",
            Some(VoiceSample {
                volume: 0.4,
                pitch: 180.0,
                wpm: 125.0,
            }),
        )
        .await
        .unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.voice_samples.len(), 1);
        assert_eq!(session.voice_samples[0].wpm, 125.0);
    }

    #[test]
    fn test_build_messages_maps_roles_and_drops_history_system_turns() {
        let id = Uuid::new_v4();
        let turn = |role, content: &str| Turn {
            session_id: id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let transcript = vec![
            turn(Role::System, "stale persona"),
            turn(Role::Assistant, "Welcome!"),
            turn(Role::User, "Hi!"),
        ];

        let messages = build_messages("fresh persona".to_string(), &transcript);

        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "assistant", "user"]);
        assert_eq!(messages[0].content, "fresh persona");
        assert!(!messages.iter().any(|m| m.content == "stale persona"));
    }
}
