//! In-memory session store. Backs tests and single-instance development;
//! state is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::EvaluationReport;
use crate::models::session::{Session, Turn, VoiceSample};
use crate::store::{SessionStateUpdate, SessionStore};

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Session>,
    turns: HashMap<Uuid, Vec<Turn>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unknown_session(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.turns.insert(session.id, Vec::new());
        inner.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.inner.read().await.sessions.get(&id).cloned())
    }

    async fn append_turn(&self, turn: &Turn) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let turns = inner
            .turns
            .get_mut(&turn.session_id)
            .ok_or_else(|| unknown_session(turn.session_id))?;
        turns.push(turn.clone());
        Ok(())
    }

    async fn list_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.turns.get(&session_id).cloned().unwrap_or_default())
    }

    async fn update_session_state(
        &self,
        id: Uuid,
        update: SessionStateUpdate,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
        session.phase = update.phase;
        session.turn_count = update.turn_count;
        session.status = update.status;
        session.ended_at = update.ended_at;
        Ok(())
    }

    async fn record_voice_sample(&self, id: Uuid, sample: VoiceSample) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
        session.voice_samples.push(sample);
        Ok(())
    }

    async fn store_report(&self, id: Uuid, report: &EvaluationReport) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
        session.report = Some(report.clone());
        Ok(())
    }
}
