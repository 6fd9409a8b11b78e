pub mod evaluation;
pub mod orchestrator;
pub mod phase;
pub mod prompts;
pub mod voice;
