use anyhow::{bail, Context, Result};

/// Which backend holds sessions and transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// Durable backend; requires `DATABASE_URL`.
    Postgres,
    /// Process-local backend for single-instance development; state is
    /// lost on restart.
    Memory,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub session_backend: SessionBackend,
    /// Required unless `SESSION_BACKEND=memory`.
    pub database_url: Option<String>,
    pub groq_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Hard cap on the number of interviewer questions before the session
    /// is forced into the closing phase.
    pub max_questions: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_backend = match std::env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => SessionBackend::Postgres,
            "memory" => SessionBackend::Memory,
            other => bail!("SESSION_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = match session_backend {
            SessionBackend::Postgres => Some(require_env("DATABASE_URL")?),
            SessionBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        Ok(Config {
            session_backend,
            database_url,
            groq_api_key: require_env("GROQ_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_questions: std::env::var("MAX_QUESTIONS")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<u32>()
                .context("MAX_QUESTIONS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
