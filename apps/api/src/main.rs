mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, SessionBackend};
use crate::db::create_pool;
use crate::interview::orchestrator::Orchestrator;
use crate::interview::phase::PhaseCaps;
use crate::llm_client::{CompletionClient, GroqClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PostgresStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the session store
    let store: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres session backend")?;
            let pool = create_pool(url).await?;
            Arc::new(PostgresStore::new(pool))
        }
        SessionBackend::Memory => {
            warn!("Using the in-memory session store; sessions are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize LLM client
    let llm: Arc<dyn CompletionClient> = Arc::new(GroqClient::new(config.groq_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the interview orchestrator
    let caps = PhaseCaps::with_max_questions(config.max_questions);
    let orchestrator = Arc::new(Orchestrator::new(store, llm.clone(), caps));
    info!("Orchestrator ready (max questions: {})", config.max_questions);

    // Build app state
    let state = AppState {
        llm,
        orchestrator,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
