use std::sync::Arc;

use crate::config::Config;
use crate::interview::orchestrator::Orchestrator;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The orchestrator owns the session store; the résumé parse route talks to
/// the completion client directly.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn CompletionClient>,
    pub orchestrator: Arc<Orchestrator>,
    /// Kept for handlers that need runtime knobs beyond the orchestrator's.
    #[allow(dead_code)]
    pub config: Config,
}
