//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use intake_agent::TurnRunner;
use intake_handoff::CrmClient;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Turn runner wired with the engine, tools, memory, and ledger.
    pub runner: Arc<TurnRunner>,
    /// CRM client for inquiry form lead creation.
    pub crm: Arc<dyn CrmClient>,
    /// Listen port, used for CORS origin configuration.
    pub port: u16,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(runner: Arc<TurnRunner>, crm: Arc<dyn CrmClient>, port: u16) -> Self {
        Self {
            runner,
            crm,
            port,
            start_time: Instant::now(),
        }
    }
}
