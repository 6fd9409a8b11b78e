//! Phase state machine — decides, once per user turn and before the reply
//! is generated, whether the session moves to the next phase.
//!
//! Two signals feed the decision:
//! 1. A hard numeric cap per phase. When the per-phase counter reaches the
//!    cap, the transition commits without consulting the model. This is the
//!    deterministic upper bound on interview length.
//! 2. Below the cap, a forced single-label classifier call. Its verdict is
//!    advisory only: anything that is not a recognized label, or that would
//!    move backward or skip a phase, is discarded and the session stays put.
//!    A failed classifier call also stays put — it never fails the turn.

use tracing::{debug, warn};

use crate::llm_client::{ChatMessage, CompletionClient, CompletionOptions};
use crate::models::session::{Phase, Turn};

/// How many trailing transcript turns the classifier sees. Kept small to
/// cap cost; the latest user utterance is passed separately.
const CLASSIFIER_WINDOW: usize = 4;

const CLASSIFIER_MAX_TOKENS: u32 = 8;

/// Hard per-phase caps on completed assistant turns before the session is
/// forced into the next phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseCaps {
    pub greeting: u32,
    pub introduction: u32,
    pub questions: u32,
}

impl Default for PhaseCaps {
    fn default() -> Self {
        Self {
            greeting: 1,
            introduction: 2,
            questions: 4,
        }
    }
}

impl PhaseCaps {
    pub fn with_max_questions(max_questions: u32) -> Self {
        Self {
            questions: max_questions.max(1),
            ..Default::default()
        }
    }

    /// The cap for a phase, or `None` where no cap applies (closing).
    pub fn for_phase(&self, phase: Phase) -> Option<u32> {
        match phase {
            Phase::Greeting => Some(self.greeting),
            Phase::Introduction => Some(self.introduction),
            Phase::Questions => Some(self.questions),
            Phase::Closing => None,
        }
    }
}

/// Validates a classifier verdict against the current phase.
///
/// Only two outcomes can commit: staying put, or a single forward step.
/// Unrecognized labels, backward moves, and skips all collapse to the
/// current phase so a hallucinated label can never corrupt the machine.
pub fn validate_verdict(current: Phase, label: &str) -> Phase {
    match Phase::from_label(label) {
        Some(target) if target == current => current,
        Some(target) if Some(target) == current.next() => target,
        Some(target) => {
            warn!(
                "Classifier proposed illegal move {} -> {}; staying",
                current.as_str(),
                target.as_str()
            );
            current
        }
        None => {
            warn!("Classifier returned unrecognized label {label:?}; staying");
            current
        }
    }
}

/// Builds the compact classification context: phase, per-phase turn count,
/// a bounded transcript window, and the latest user utterance, plus the
/// deterministic transition rules the model must apply.
pub fn build_classifier_prompt(
    current: Phase,
    turn_count: u32,
    recent_turns: &[Turn],
    user_input: &str,
) -> String {
    let window_start = recent_turns.len().saturating_sub(CLASSIFIER_WINDOW);
    let history_text = recent_turns[window_start..]
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the interview progress.\n\
         Current State: {current}\n\
         Turns spent in this state: {turn_count}\n\
         \n\
         Recent History:\n\
         {history_text}\n\
         \n\
         Candidate's Latest Input: \"{user_input}\"\n\
         \n\
         Your task is to decide the next state. Follow these rules:\n\
         - If state is GREETING: Move to INTRODUCTION if the candidate has acknowledged the greeting.\n\
         - If state is INTRODUCTION: Move to QUESTIONS once the candidate has introduced themselves or agreed to start.\n\
         - If state is QUESTIONS: Move to CLOSING if the candidate says they have no more to add, asks to finish, or if the interviewer has already covered several topics.\n\
         - Otherwise: Stay in the {current} state.\n\
         \n\
         Respond with ONLY one word from this list: [GREETING, INTRODUCTION, QUESTIONS, CLOSING]",
        current = current.as_str(),
    )
}

/// Runs the full transition decision and returns the validated target phase
/// (possibly the current one). Never errors: classifier trouble means the
/// session stays in its current phase.
pub async fn decide_transition(
    llm: &dyn CompletionClient,
    current: Phase,
    turn_count: u32,
    caps: PhaseCaps,
    recent_turns: &[Turn],
    user_input: &str,
) -> Phase {
    // Closing self-loops; no decision to make.
    let Some(next) = current.next() else {
        return current;
    };

    // Hard cap override: deterministic, no classifier call.
    if let Some(cap) = caps.for_phase(current) {
        if turn_count >= cap {
            debug!(
                "Phase cap reached ({turn_count}/{cap}); forcing {} -> {}",
                current.as_str(),
                next.as_str()
            );
            return next;
        }
    }

    let prompt = build_classifier_prompt(current, turn_count, recent_turns, user_input);
    let messages = [ChatMessage::user(prompt)];
    let opts = CompletionOptions {
        temperature: 0.0,
        max_tokens: CLASSIFIER_MAX_TOKENS,
        want_json: false,
    };

    match llm.complete(&messages, opts).await {
        Ok(label) => validate_verdict(current, &label),
        Err(e) => {
            warn!("Phase classifier call failed ({e}); staying in {}", current.as_str());
            current
        }
    }
}
