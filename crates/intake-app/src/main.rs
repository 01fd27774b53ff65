//! Intake application binary - composition root.
//!
//! Ties together all intake crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite store (memory turns + session ledger)
//! 3. Wire the tool capabilities (knowledge base, translation, handoff)
//! 4. Select the reasoning engine (HTTP, or scripted when unconfigured)
//! 5. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;

use intake_agent::engine::{HttpReasoningEngine, ReasoningEngine, ScriptedEngine};
use intake_agent::tools::{KnowledgeTool, ToolSet, TranslateTool};
use intake_agent::TurnRunner;
use intake_api::{create_router, AppState};
use intake_core::config::IntakeConfig;
use intake_handoff::{CrmClient, HandoffOrchestrator, HttpCrmClient, HttpMessageGateway};
use intake_memory::{Database, MemoryGateway, SessionLedger, SqliteMemoryStore};

fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("INTAKE_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".intake").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting intake v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = IntakeConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let db_path = PathBuf::from(&config.memory.db_path);
    if let Some(parent) = db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!(path = %parent.display(), error = %e, "Failed to create data directory");
            return Err(e.into());
        }
    }
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let memory = Arc::new(MemoryGateway::new(Arc::new(SqliteMemoryStore::new(
        Arc::clone(&db),
    ))));
    let ledger = Arc::new(SessionLedger::new(Arc::clone(&db)));

    // Tool capabilities.
    let crm: Arc<dyn CrmClient> = Arc::new(HttpCrmClient::new(config.crm.clone()));
    let handoff = Arc::new(HandoffOrchestrator::new(
        Arc::clone(&crm),
        Arc::new(HttpMessageGateway::new(
            config.messaging.clone(),
            &config.university.short_name,
        )),
        Arc::clone(&memory),
        config.memory.max_history_turns,
    ));
    let tools = Arc::new(ToolSet::new(
        KnowledgeTool::new(config.knowledge.clone()),
        TranslateTool::new(config.translation.clone()),
        handoff,
    ));

    // Reasoning engine. Without an endpoint, fall back to a scripted engine
    // so the pipeline stays exercisable end to end.
    let engine: Arc<dyn ReasoningEngine> = if config.engine.base_url.is_empty() {
        tracing::warn!("No engine endpoint configured; using scripted engine");
        Arc::new(ScriptedEngine::canned(
            "Thanks for reaching out! An admissions assistant will be with you shortly.",
        ))
    } else {
        tracing::info!(url = %config.engine.base_url, model = %config.engine.model, "Engine configured");
        Arc::new(HttpReasoningEngine::new(config.engine.clone()))
    };

    let port = config.general.port;
    let runner = Arc::new(TurnRunner::new(engine, tools, memory, ledger, config));

    // === API server ===

    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(AppState::new(runner, crm, port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind API server");
            return Err(e.into());
        }
    };
    tracing::info!(addr = %addr, "API server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
