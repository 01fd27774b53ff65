//! Local tool capabilities dispatched by name during a turn.
//!
//! The engine announces a tool invocation with an input object; the turn
//! runner resolves it here and relays the string result back into the event
//! stream. Tool failures are rendered as text, never raised, so a bad tool
//! call cannot abort the turn.

pub mod knowledge;
pub mod translate;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use intake_core::types::TurnContext;
use intake_handoff::{HandoffOrchestrator, HandoffRequest};

pub use knowledge::KnowledgeTool;
pub use translate::TranslateTool;

pub const TOOL_RETRIEVE: &str = "retrieve_university_info";
pub const TOOL_HANDOFF: &str = "complete_advisor_handoff";
pub const TOOL_TRANSLATE: &str = "translate_text";

/// The capability set available to the engine for one deployment.
pub struct ToolSet {
    knowledge: KnowledgeTool,
    translate: TranslateTool,
    handoff: Arc<HandoffOrchestrator>,
}

impl ToolSet {
    pub fn new(
        knowledge: KnowledgeTool,
        translate: TranslateTool,
        handoff: Arc<HandoffOrchestrator>,
    ) -> Self {
        Self {
            knowledge,
            translate,
            handoff,
        }
    }

    /// Dispatch one tool invocation. The turn context is threaded in
    /// explicitly so concurrent turns cannot observe each other's contact
    /// or session identifiers.
    pub async fn dispatch(&self, name: &str, input: &Value, ctx: &TurnContext) -> String {
        info!(tool = name, "dispatching tool invocation");
        match name {
            TOOL_RETRIEVE => {
                let query = input
                    .get("text")
                    .or_else(|| input.get("query"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let max_results = input
                    .get("number_of_results")
                    .and_then(Value::as_u64)
                    .map(|n| n as usize);
                let min_score = input.get("score").and_then(Value::as_f64);
                self.knowledge.retrieve(query, max_results, min_score).await
            }
            TOOL_TRANSLATE => {
                let text = input.get("text").and_then(Value::as_str).unwrap_or_default();
                let target = input
                    .get("target_language")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let source = input.get("source_language").and_then(Value::as_str);
                self.translate.translate(text, target, source).await
            }
            TOOL_HANDOFF => self.run_handoff(input, ctx).await,
            other => {
                warn!(tool = other, "unknown tool requested");
                format!("Error: unknown tool '{}'.", other)
            }
        }
    }

    async fn run_handoff(&self, input: &Value, ctx: &TurnContext) -> String {
        let request: HandoffRequest = match serde_json::from_value(input.clone()) {
            Ok(request) => request,
            Err(e) => return format!("Error: malformed handoff request: {}", e),
        };
        match self.handoff.run(&request, ctx).await {
            Ok(report) => report.render(),
            Err(e) => {
                warn!(error = %e, "advisor handoff failed");
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use intake_core::config::{CrmConfig, KnowledgeConfig, MessagingConfig, TranslationConfig};
    use intake_handoff::{HttpCrmClient, HttpMessageGateway};
    use intake_memory::{Database, MemoryGateway, SqliteMemoryStore};

    fn tool_set() -> ToolSet {
        let db = Arc::new(Database::in_memory().unwrap());
        let memory = Arc::new(MemoryGateway::new(Arc::new(SqliteMemoryStore::new(db))));
        let handoff = Arc::new(HandoffOrchestrator::new(
            Arc::new(HttpCrmClient::new(CrmConfig::default())),
            Arc::new(HttpMessageGateway::new(MessagingConfig::default(), "test")),
            memory,
            5,
        ));
        ToolSet::new(
            KnowledgeTool::new(KnowledgeConfig::default()),
            TranslateTool::new(TranslationConfig::default()),
            handoff,
        )
    }

    fn ctx() -> TurnContext {
        TurnContext::new("+15551234567", "s1")
    }

    #[tokio::test]
    async fn test_unknown_tool_named_in_error() {
        let out = tool_set().dispatch("make_coffee", &json!({}), &ctx()).await;
        assert_eq!(out, "Error: unknown tool 'make_coffee'.");
    }

    #[tokio::test]
    async fn test_retrieve_accepts_query_alias() {
        let out = tool_set()
            .dispatch(TOOL_RETRIEVE, &json!({"query": ""}), &ctx())
            .await;
        // Empty query surfaces the tool's own validation message.
        assert!(out.contains("query is required"));
    }

    #[tokio::test]
    async fn test_handoff_without_crm_credentials_reports_unavailable() {
        let input = json!({
            "conversation_summary": "Asked about MBA.",
            "outbound_message": "An advisor will reach out.",
        });
        let out = tool_set().dispatch(TOOL_HANDOFF, &input, &ctx()).await;
        assert!(out.starts_with("Error:"));
        assert!(out.contains("credentials"));
    }

    #[tokio::test]
    async fn test_handoff_with_malformed_input_reported() {
        let out = tool_set()
            .dispatch(TOOL_HANDOFF, &json!("not an object"), &ctx())
            .await;
        assert!(out.contains("malformed handoff request"));
    }
}
