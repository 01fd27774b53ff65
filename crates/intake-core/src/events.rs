//! Turn request and response event types.
//!
//! A turn request carries the user prompt plus the session and contact
//! identifiers. The response is a sequence of `TurnEvent`s streamed back to
//! the caller; each event serializes as a single-key JSON object
//! (`{"response": ...}`, `{"thinking": ...}`, and so on) so that web and
//! messaging frontends can dispatch on the key alone.

use serde::{Deserialize, Serialize};

/// One unit of the streamed turn response.
///
/// Exactly one `FinalResult` or terminal `Error` ends a successful turn.
/// `Response` events carry incremental or full assistant text; concatenated
/// in arrival order they reconstruct the canonical final text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEvent {
    /// Incremental or full assistant text.
    Response(String),
    /// Human-readable progress notice (e.g. a tool invocation started).
    Thinking(String),
    /// Output of a tool invocation, relayed verbatim.
    ToolResult(String),
    /// Canonical final text for the turn.
    FinalResult(String),
    /// Turn-level or event-level error.
    Error(String),
}

/// Speaker role for a stored conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Storage form used as the role column in the memory store.
    pub fn as_storage(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }

    /// Capitalized display name used when rendering history blocks.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }

    /// Parse the storage form back into a role. Case-insensitive.
    pub fn from_storage(s: &str) -> Option<Role> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ASSISTANT" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_storage())
    }
}

/// Inbound turn request. Wire fields are camelCase (`sessionId`,
/// `contactAddress`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub contact_address: String,
}

impl TurnRequest {
    /// Validate required fields, returning the first missing one as a
    /// caller-facing message. A failed validation terminates the turn with
    /// a single error event and no further processing.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.prompt.is_empty() {
            return Err("Prompt is required".to_string());
        }
        if self.session_id.is_empty() {
            return Err("Session ID is required".to_string());
        }
        if self.contact_address.is_empty() {
            return Err("Contact address is required".to_string());
        }
        Ok(())
    }
}
