//! Conversation memory gateway: best-effort read, best-effort write.
//!
//! History fetch failure must never block the primary conversational path,
//! so every store failure is caught, logged, and converted to a neutral
//! result (no-op on write, empty string on read).

use std::sync::Arc;

use tracing::{debug, warn};

use intake_core::events::Role;

use crate::store::MemoryStore;

/// Gateway over the conversation memory store.
pub struct MemoryGateway {
    store: Arc<dyn MemoryStore>,
}

impl MemoryGateway {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Append one turn to durable memory.
    ///
    /// No-op (logged, not fatal) when the actor id or session id is absent.
    /// Store failures are logged and swallowed.
    pub fn append(&self, actor_id: &str, session_id: &str, role: Role, content: &str) {
        if actor_id.is_empty() || session_id.is_empty() {
            debug!("Skipping memory append - missing actor or session id");
            return;
        }
        match self.store.append_turn(actor_id, session_id, role, content) {
            Ok(()) => {
                debug!(role = %role, actor = %actor_id, session = %session_id, "Memory turn written");
            }
            Err(e) => {
                warn!(error = %e, "Failed to write memory turn");
            }
        }
    }

    /// Fetch up to `max_turns` most recent turns rendered as a textual
    /// history block: one `"<Role>: <content>"` line per turn, oldest first.
    ///
    /// Returns an empty string when the store is unreachable, misconfigured,
    /// or no turns exist.
    pub fn fetch_history(&self, actor_id: &str, session_id: &str, max_turns: usize) -> String {
        if actor_id.is_empty() || session_id.is_empty() {
            return String::new();
        }
        match self.store.last_turns(actor_id, session_id, max_turns) {
            Ok(turns) => {
                if turns.is_empty() {
                    debug!(session = %session_id, "No conversation history found");
                    return String::new();
                }
                turns
                    .iter()
                    .map(|t| format!("{}: {}", t.role.display_name(), t.content))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Err(e) => {
                warn!(error = %e, session = %session_id, "Failed to retrieve session history");
                String::new()
            }
        }
    }
}
