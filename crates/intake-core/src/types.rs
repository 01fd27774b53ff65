//! Shared domain types used across the intake crates.

use serde::{Deserialize, Serialize};

use crate::events::Role;

/// One immutable message stored in conversation memory.
///
/// Turns are never mutated or deleted; `seq` preserves write order within a
/// session so that reads come back in the order the conversation happened.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryTurn {
    pub actor_id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Monotonic per-session write order.
    pub seq: i64,
}

/// Per-turn ambient context made available to tool invocations.
///
/// Threaded explicitly from the turn runner into capability implementations;
/// never shared mutable state across concurrent turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnContext {
    pub contact_address: String,
    pub session_id: String,
}

impl TurnContext {
    pub fn new(contact_address: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            contact_address: contact_address.into(),
            session_id: session_id.into(),
        }
    }
}
