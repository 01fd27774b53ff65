//! Turn stream aggregation: collapse the engine's partially-redundant event
//! stream into exactly one textual rendition per turn.
//!
//! The engine may emit the same assistant text twice, once as incremental
//! deltas and again inside the complete message. Once a non-empty delta has
//! been relayed, the complete message's text is accumulated for the final
//! result but never relayed as a second response. Tool results embedded in
//! the complete message are relayed unconditionally; they appear once per
//! invocation.

use std::collections::HashSet;

use intake_core::events::TurnEvent;

use crate::engine::{EngineEvent, MessageSegment};
use crate::tools::{TOOL_HANDOFF, TOOL_RETRIEVE};

/// Per-turn aggregation state. Create one per turn, feed every engine event
/// through `ingest`, then read `final_text` at stream end.
#[derive(Default)]
pub struct TurnAggregator {
    university_short_name: String,
    streamed_via_deltas: bool,
    delta_chunks: Vec<String>,
    fallback_full_text: String,
    announced_tools: HashSet<String>,
}

impl TurnAggregator {
    pub fn new(university_short_name: &str) -> Self {
        Self {
            university_short_name: university_short_name.to_string(),
            ..Self::default()
        }
    }

    fn tool_notice(&self, name: &str) -> String {
        match name {
            TOOL_RETRIEVE => format!(
                "🔍 Searching {} knowledge base for relevant information...",
                self.university_short_name
            ),
            TOOL_HANDOFF => "🤝 Processing advisor handoff (searching CRM, creating task, \
                             sending confirmation message)..."
                .to_string(),
            other => format!("Using {}...", other),
        }
    }

    /// Process one engine event, returning the events to relay to the
    /// caller now, in order.
    pub fn ingest(&mut self, event: &EngineEvent) -> Vec<TurnEvent> {
        match event {
            EngineEvent::ContentDelta(text) => {
                if text.is_empty() {
                    return Vec::new();
                }
                self.streamed_via_deltas = true;
                self.delta_chunks.push(text.clone());
                vec![TurnEvent::Response(text.clone())]
            }
            EngineEvent::Thinking(text) => vec![TurnEvent::Thinking(text.clone())],
            EngineEvent::ToolUse { name, .. } => {
                // One progress notice per tool name per turn.
                if self.announced_tools.insert(name.clone()) {
                    vec![TurnEvent::Thinking(self.tool_notice(name))]
                } else {
                    Vec::new()
                }
            }
            EngineEvent::Message(segments) => {
                let mut out = Vec::new();
                for segment in segments {
                    match segment {
                        MessageSegment::Text(text) => {
                            self.fallback_full_text.push_str(text);
                            if !self.streamed_via_deltas {
                                out.push(TurnEvent::Response(text.clone()));
                            }
                        }
                        MessageSegment::ToolResult(text) => {
                            out.push(TurnEvent::ToolResult(text.clone()));
                        }
                    }
                }
                out
            }
            EngineEvent::Error(text) => vec![TurnEvent::Error(text.clone())],
        }
    }

    /// Canonical final text for the turn: the joined deltas when any were
    /// relayed, otherwise the complete-message text.
    pub fn final_text(&self) -> String {
        if self.streamed_via_deltas {
            self.delta_chunks.concat()
        } else {
            self.fallback_full_text.clone()
        }
    }
}
