//! Session store — the only shared resource in the system.
//!
//! All transcript and session-state mutation goes through the orchestrator,
//! which depends on this trait and never on a concrete backend. `MemoryStore`
//! backs tests and single-instance development; `PostgresStore` is the
//! durable production backend. Each method is transactional on its own; no
//! cross-call transactions are assumed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::EvaluationReport;
use crate::models::session::{Phase, Session, SessionStatus, Turn, VoiceSample};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// The phase/counter/status slice of a session that orchestrated turns
/// mutate. Applied atomically by `update_session_state`.
#[derive(Debug, Clone, Copy)]
pub struct SessionStateUpdate {
    pub phase: Phase,
    pub turn_count: u32,
    pub status: SessionStatus,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionStateUpdate {
    /// Carries a session's current state forward unchanged; callers then
    /// override the fields they are mutating.
    pub fn from_session(session: &Session) -> Self {
        Self {
            phase: session.phase,
            turn_count: session.turn_count,
            status: session.status,
            ended_at: session.ended_at,
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<(), AppError>;

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, AppError>;

    /// Appends one turn to the session transcript. The transcript is
    /// append-only; nothing ever rewrites history.
    async fn append_turn(&self, turn: &Turn) -> Result<(), AppError>;

    /// Returns the full transcript in creation order.
    async fn list_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, AppError>;

    async fn update_session_state(
        &self,
        id: Uuid,
        update: SessionStateUpdate,
    ) -> Result<(), AppError>;

    async fn record_voice_sample(&self, id: Uuid, sample: VoiceSample) -> Result<(), AppError>;

    async fn store_report(&self, id: Uuid, report: &EvaluationReport) -> Result<(), AppError>;
}
