//! Prompt Composer — produces the system-level instruction text that
//! conditions the next interviewer utterance.
//!
//! `compose` is a pure function of (phase, mode, profile, job position,
//! turn count): no I/O, no failure mode. Missing profile fields degrade to
//! neutral defaults. The phase→goal table is immutable configuration, not
//! shared mutable state.

use crate::llm_client::prompts::SPOKEN_STYLE_CONSTRAINTS;
use crate::models::cv::CandidateProfile;
use crate::models::session::{InterviewerMode, Phase};

/// Per-phase behavioral goal, parameterized before use.
/// `{job_position}` is substituted in the greeting goal; the questions goal
/// is additionally annotated with the 1-indexed question number and cap so
/// the model knows how much runway remains.
const GREETING_GOAL: &str =
    "Start the session. Welcome the candidate warmly to the {job_position} interview.";
const INTRODUCTION_GOAL: &str = "Briefly explain that you'll ask a few questions and ask them to \
     give a quick overview of their background.";
const QUESTIONS_GOAL: &str = "Ask ONE specific question at a time. Acknowledge their previous \
     point briefly, then dive into a technical or behavioral topic based on their CV. \
     You are now on question {question_number} of {max_questions}.";
const CLOSING_GOAL: &str = "The interview is over. Thank them for their time, mention that the \
     team will be in touch, and say goodbye. Do not ask more questions.";

fn persona(mode: InterviewerMode) -> &'static str {
    match mode {
        InterviewerMode::Technical => "Senior Technical Lead",
        InterviewerMode::Social => "HR Recruiter",
    }
}

fn goal_for(phase: Phase, job_position: &str, turn_count: u32, max_questions: u32) -> String {
    match phase {
        Phase::Greeting => GREETING_GOAL.replace("{job_position}", job_position),
        Phase::Introduction => INTRODUCTION_GOAL.to_string(),
        Phase::Questions => QUESTIONS_GOAL
            .replace("{question_number}", &(turn_count + 1).to_string())
            .replace("{max_questions}", &max_questions.to_string()),
        Phase::Closing => CLOSING_GOAL.to_string(),
    }
}

/// Builds the controlling instruction for the next interviewer utterance.
pub fn compose(
    phase: Phase,
    mode: InterviewerMode,
    profile: &CandidateProfile,
    job_position: &str,
    turn_count: u32,
    max_questions: u32,
) -> String {
    let cv_summary = format!(
        "Name: {}. Skills: {}.",
        profile.display_name(),
        profile.skills_summary()
    );

    format!(
        "Role: {persona}\n\
         Context: Interviewing for {job_position}.\n\
         Candidate Profile: {cv_summary}\n\
         Current Phase: {phase}\n\
         \n\
         Goal: {goal}\n\
         \n\
         {constraints}",
        persona = persona(mode),
        phase = phase.as_str(),
        goal = goal_for(phase, job_position, turn_count, max_questions),
        constraints = SPOKEN_STYLE_CONSTRAINTS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> CandidateProfile {
        CandidateProfile {
            name: "Ana".to_string(),
            skills: vec!["Go".to_string(), "SQL".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_technical_mode_uses_technical_lead_persona() {
        let prompt = compose(
            Phase::Greeting,
            InterviewerMode::Technical,
            &ana(),
            "Backend Engineer",
            0,
            4,
        );
        assert!(prompt.contains("Senior Technical Lead"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("Name: Ana. Skills: Go, SQL."));
    }

    #[test]
    fn test_social_mode_uses_hr_persona() {
        let prompt = compose(
            Phase::Greeting,
            InterviewerMode::Social,
            &ana(),
            "Backend Engineer",
            0,
            4,
        );
        assert!(prompt.contains("HR Recruiter"));
        assert!(!prompt.contains("Senior Technical Lead"));
    }

    #[test]
    fn test_questions_goal_carries_question_number_and_cap() {
        let prompt = compose(
            Phase::Questions,
            InterviewerMode::Technical,
            &ana(),
            "Backend Engineer",
            2,
            4,
        );
        // turn_count 2 means the third question is being asked.
        assert!(prompt.contains("question 3 of 4"));
    }

    #[test]
    fn test_closing_goal_forbids_further_questions() {
        let prompt = compose(
            Phase::Closing,
            InterviewerMode::Social,
            &ana(),
            "Backend Engineer",
            0,
            4,
        );
        assert!(prompt.contains("Do not ask more questions"));
        assert!(prompt.contains("Thank them for their time"));
    }

    #[test]
    fn test_missing_profile_fields_degrade_to_defaults() {
        let prompt = compose(
            Phase::Introduction,
            InterviewerMode::Social,
            &CandidateProfile::default(),
            "Data Analyst",
            0,
            4,
        );
        assert!(prompt.contains("Name: Candidate."));
        assert!(prompt.contains("Skills: not specified."));
    }

    #[test]
    fn test_style_constraints_appended_to_every_phase() {
        for phase in [
            Phase::Greeting,
            Phase::Introduction,
            Phase::Questions,
            Phase::Closing,
        ] {
            let prompt = compose(
                phase,
                InterviewerMode::Technical,
                &ana(),
                "Backend Engineer",
                0,
                4,
            );
            assert!(prompt.contains("NEVER use markdown formatting"));
            assert!(prompt.contains("Do not break character"));
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose(
            Phase::Questions,
            InterviewerMode::Technical,
            &ana(),
            "Backend Engineer",
            1,
            4,
        );
        let b = compose(
            Phase::Questions,
            InterviewerMode::Technical,
            &ana(),
            "Backend Engineer",
            1,
            4,
        );
        assert_eq!(a, b);
    }
}
