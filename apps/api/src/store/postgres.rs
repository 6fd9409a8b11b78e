//! Durable session store over PostgreSQL.
//!
//! Expected schema (applied out-of-band; migration tooling is not part of
//! this service):
//!
//! ```sql
//! CREATE TABLE sessions (
//!     id            UUID PRIMARY KEY,
//!     profile       JSONB NOT NULL,
//!     job_position  TEXT NOT NULL,
//!     job_description TEXT,
//!     mode          TEXT NOT NULL,
//!     phase         TEXT NOT NULL,
//!     turn_count    INT NOT NULL DEFAULT 0,
//!     status        TEXT NOT NULL DEFAULT 'init',
//!     baseline      JSONB,
//!     voice_samples JSONB NOT NULL DEFAULT '[]',
//!     report        JSONB,
//!     started_at    TIMESTAMPTZ NOT NULL,
//!     ended_at      TIMESTAMPTZ
//! );
//!
//! CREATE TABLE turns (
//!     id         BIGSERIAL PRIMARY KEY,
//!     session_id UUID NOT NULL REFERENCES sessions(id),
//!     role       TEXT NOT NULL,
//!     content    TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX turns_session_order ON turns (session_id, id);
//! ```

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::EvaluationReport;
use crate::models::session::{
    InterviewerMode, Phase, Role, Session, SessionStatus, Turn, VoiceSample,
};
use crate::store::{SessionStateUpdate, SessionStore};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    profile: Value,
    job_position: String,
    job_description: Option<String>,
    mode: String,
    phase: String,
    turn_count: i32,
    status: String,
    baseline: Option<Value>,
    voice_samples: Value,
    report: Option<Value>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> Result<Session, AppError> {
        let phase = Phase::from_label(&self.phase)
            .ok_or_else(|| AppError::Internal(anyhow!("Corrupt phase column: {}", self.phase)))?;
        let status = SessionStatus::from_str(&self.status)
            .ok_or_else(|| AppError::Internal(anyhow!("Corrupt status column: {}", self.status)))?;

        Ok(Session {
            id: self.id,
            profile: serde_json::from_value(self.profile)
                .map_err(|e| AppError::Internal(anyhow!("Corrupt profile column: {e}")))?,
            job_position: self.job_position,
            job_description: self.job_description,
            mode: InterviewerMode::parse(&self.mode),
            phase,
            turn_count: self.turn_count.max(0) as u32,
            status,
            baseline: self
                .baseline
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| AppError::Internal(anyhow!("Corrupt baseline column: {e}")))?,
            voice_samples: serde_json::from_value::<Vec<VoiceSample>>(self.voice_samples)
                .map_err(|e| AppError::Internal(anyhow!("Corrupt voice_samples column: {e}")))?,
            report: self
                .report
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| AppError::Internal(anyhow!("Corrupt report column: {e}")))?,
            started_at: self.started_at,
            ended_at: self.ended_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TurnRow {
    session_id: Uuid,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TurnRow {
    fn into_turn(self) -> Result<Turn, AppError> {
        Ok(Turn {
            session_id: self.session_id,
            role: Role::from_str(&self.role)
                .ok_or_else(|| AppError::Internal(anyhow!("Corrupt role column: {}", self.role)))?,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize {what}: {e}")))
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions
                (id, profile, job_position, job_description, mode, phase,
                 turn_count, status, baseline, voice_samples, report, started_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(session.id)
        .bind(to_json(&session.profile, "profile")?)
        .bind(&session.job_position)
        .bind(&session.job_description)
        .bind(session.mode.as_str())
        .bind(session.phase.as_str())
        .bind(session.turn_count as i32)
        .bind(session.status.as_str())
        .bind(session.baseline.as_ref().map(|b| to_json(b, "baseline")).transpose()?)
        .bind(to_json(&session.voice_samples, "voice_samples")?)
        .bind(session.report.as_ref().map(|r| to_json(r, "report")).transpose()?)
        .bind(session.started_at)
        .bind(session.ended_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, AppError> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn append_turn(&self, turn: &Turn) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO turns (session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(turn.session_id)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(turn.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, AppError> {
        let rows: Vec<TurnRow> = sqlx::query_as(
            "SELECT session_id, role, content, created_at FROM turns \
             WHERE session_id = $1 ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TurnRow::into_turn).collect()
    }

    async fn update_session_state(
        &self,
        id: Uuid,
        update: SessionStateUpdate,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET phase = $1, turn_count = $2, status = $3, ended_at = $4
            WHERE id = $5
            "#,
        )
        .bind(update.phase.as_str())
        .bind(update.turn_count as i32)
        .bind(update.status.as_str())
        .bind(update.ended_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {id} not found")));
        }
        Ok(())
    }

    async fn record_voice_sample(&self, id: Uuid, sample: VoiceSample) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET voice_samples = voice_samples || $1::jsonb WHERE id = $2",
        )
        .bind(to_json(&vec![sample], "voice sample")?)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {id} not found")));
        }
        Ok(())
    }

    async fn store_report(&self, id: Uuid, report: &EvaluationReport) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sessions SET report = $1 WHERE id = $2")
            .bind(to_json(report, "report")?)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {id} not found")));
        }
        Ok(())
    }
}
