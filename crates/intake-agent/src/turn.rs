//! Per-turn orchestration: identity resolution, session tracking, memory
//! reads and writes, engine invocation, and event relay.
//!
//! A turn is one sequential task. Memory and ledger failures never abort
//! it; the stream always terminates with exactly one `final_result` or a
//! terminal `error` event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use intake_core::config::IntakeConfig;
use intake_core::events::{Role, TurnEvent, TurnRequest};
use intake_core::identity::normalize_actor_id;
use intake_core::types::TurnContext;
use intake_memory::{MemoryGateway, SessionLedger, TrackOutcome};

use crate::aggregator::TurnAggregator;
use crate::engine::{EngineEvent, ReasoningEngine};
use crate::prompt::{compose_system_prompt, compose_user_prompt};
use crate::tools::ToolSet;

/// Runs turns against the configured engine and capability set.
pub struct TurnRunner {
    engine: Arc<dyn ReasoningEngine>,
    tools: Arc<ToolSet>,
    memory: Arc<MemoryGateway>,
    ledger: Arc<SessionLedger>,
    config: IntakeConfig,
}

impl TurnRunner {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        tools: Arc<ToolSet>,
        memory: Arc<MemoryGateway>,
        ledger: Arc<SessionLedger>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            engine,
            tools,
            memory,
            ledger,
            config,
        }
    }

    /// Start one turn. Events arrive on the returned channel until the turn
    /// terminates.
    pub fn run(self: &Arc<Self>, request: TurnRequest) -> mpsc::Receiver<TurnEvent> {
        let (tx, rx) = mpsc::channel(32);
        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.run_inner(request, tx).await;
        });
        rx
    }

    async fn run_inner(&self, request: TurnRequest, tx: mpsc::Sender<TurnEvent>) {
        if let Err(message) = request.validate() {
            let _ = tx.send(TurnEvent::Error(message)).await;
            return;
        }
        let actor_id = match normalize_actor_id(&request.contact_address) {
            Ok(actor_id) => actor_id,
            Err(e) => {
                let _ = tx.send(TurnEvent::Error(e.to_string())).await;
                return;
            }
        };
        info!(actor_id = %actor_id, session_id = %request.session_id, "turn started");

        match self
            .ledger
            .track(&request.contact_address, &request.session_id)
        {
            TrackOutcome::Created { total_sessions } => {
                debug!(total_sessions, "session created for contact");
            }
            TrackOutcome::Updated { total_sessions } => {
                debug!(total_sessions, "session refreshed for contact");
            }
            TrackOutcome::Failed { reason } => {
                warn!(reason, "session tracking failed, continuing without it");
            }
        }

        // History is read before the current prompt is written, so the
        // history block never repeats the message being answered.
        let history = self.memory.fetch_history(
            &actor_id,
            &request.session_id,
            self.config.memory.max_history_turns,
        );
        self.memory
            .append(&actor_id, &request.session_id, Role::User, &request.prompt);
        // Give the store a beat to absorb the write before the engine runs.
        tokio::time::sleep(Duration::from_millis(self.config.memory.consistency_delay_ms)).await;

        let system_prompt = compose_system_prompt(&self.config.university);
        let user_prompt = compose_user_prompt(&history, &request.prompt);
        let ctx = TurnContext::new(&request.contact_address, &request.session_id);

        let mut stream = match self.engine.stream_turn(&system_prompt, &user_prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = tx.send(TurnEvent::Error(e.to_string())).await;
                return;
            }
        };

        let mut aggregator = TurnAggregator::new(&self.config.university.short_name);
        while let Some(item) = stream.recv().await {
            match item {
                Ok(event) => {
                    for relayed in aggregator.ingest(&event) {
                        if tx.send(relayed).await.is_err() {
                            return;
                        }
                    }
                    if let EngineEvent::ToolUse {
                        name,
                        input: Some(input),
                    } = &event
                    {
                        let result = self.tools.dispatch(name, input, &ctx).await;
                        if tx.send(TurnEvent::ToolResult(result)).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    // Everything accumulated so far was already relayed;
                    // terminate with an error instead of a final result.
                    warn!(error = %e, "engine stream broke mid-turn");
                    let _ = tx.send(TurnEvent::Error(e.to_string())).await;
                    return;
                }
            }
        }

        let final_text = aggregator.final_text();
        if !final_text.is_empty() {
            self.memory
                .append(&actor_id, &request.session_id, Role::Assistant, &final_text);
        }
        info!(chars = final_text.len(), "turn complete");
        let _ = tx.send(TurnEvent::FinalResult(final_text)).await;
    }
}
