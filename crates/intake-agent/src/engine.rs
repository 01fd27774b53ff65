//! Reasoning engine seam and event decoding.
//!
//! The engine produces a heterogeneous event stream: incremental text
//! deltas, reasoning traces, tool invocations, and complete assistant
//! messages, in several wire encodings. `decode_engine_event` maps each raw
//! JSON object onto the `EngineEvent` variants; unrecognized shapes decode
//! to `None` and are skipped by the consumer.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use intake_core::config::EngineConfig;
use intake_core::error::{IntakeError, Result};

/// One segment of a complete assistant message.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageSegment {
    Text(String),
    ToolResult(String),
}

/// Decoded reasoning-engine event.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Incremental assistant text fragment.
    ContentDelta(String),
    /// Reasoning trace text.
    Thinking(String),
    /// A tool invocation. `input` is present once the engine has finished
    /// assembling the arguments.
    ToolUse { name: String, input: Option<Value> },
    /// Complete assistant message, possibly redundant with earlier deltas.
    Message(Vec<MessageSegment>),
    /// Event-level error. The stream continues after one of these.
    Error(String),
}

/// Decode one raw engine event. Returns `None` for unrecognized shapes.
pub fn decode_engine_event(raw: &Value) -> Option<EngineEvent> {
    if let Some(text) = raw.get("data").and_then(Value::as_str) {
        return Some(EngineEvent::ContentDelta(text.to_string()));
    }
    if let Some(delta) = raw.get("delta") {
        match delta.get("type").and_then(Value::as_str) {
            Some("output_text_delta") => {
                let text = delta
                    .get("delta")
                    .and_then(|d| d.get("text"))
                    .and_then(Value::as_str)?;
                return Some(EngineEvent::ContentDelta(text.to_string()));
            }
            Some("content_block_delta") => {
                let nested = delta.get("delta")?;
                if nested.get("type").and_then(Value::as_str) != Some("text_delta") {
                    return None;
                }
                let text = nested.get("text").and_then(Value::as_str)?;
                return Some(EngineEvent::ContentDelta(text.to_string()));
            }
            // End-of-text marker, nothing to relay.
            Some("output_text_stop_delta") => return None,
            _ => {}
        }
        // Untyped deltas carry the fragment directly.
        if let Some(text) = delta.get("text").and_then(Value::as_str) {
            return Some(EngineEvent::ContentDelta(text.to_string()));
        }
        return None;
    }
    if let Some(text) = raw.get("reasoning_text").and_then(Value::as_str) {
        return Some(EngineEvent::Thinking(text.to_string()));
    }
    if let Some(tool) = raw.get("current_tool_use") {
        let name = tool.get("name").and_then(Value::as_str)?.to_string();
        let input = tool.get("input").filter(|v| v.is_object()).cloned();
        return Some(EngineEvent::ToolUse { name, input });
    }
    if let Some(message) = raw.get("message") {
        let content = message.get("content").and_then(Value::as_array)?;
        let mut segments = Vec::new();
        for block in content {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                segments.push(MessageSegment::Text(text.to_string()));
            } else if let Some(result) = block.get("toolResult") {
                let text = result
                    .get("content")
                    .and_then(Value::as_array)
                    .map(|blocks| {
                        blocks
                            .iter()
                            .filter_map(|b| b.get("text").and_then(Value::as_str))
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();
                segments.push(MessageSegment::ToolResult(text));
            }
            // Other block kinds (images, etc.) are skipped.
        }
        return Some(EngineEvent::Message(segments));
    }
    if let Some(text) = raw.get("error").and_then(Value::as_str) {
        return Some(EngineEvent::Error(text.to_string()));
    }
    None
}

/// Streams one turn's worth of engine events.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Start a turn against the engine. Events arrive on the returned
    /// channel; a channel-level `Err` means the stream broke mid-turn.
    async fn stream_turn(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<mpsc::Receiver<Result<EngineEvent>>>;
}

/// HTTP-backed engine speaking newline-delimited JSON.
pub struct HttpReasoningEngine {
    client: reqwest::Client,
    config: EngineConfig,
}

impl HttpReasoningEngine {
    pub fn new(config: EngineConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }
}

#[async_trait]
impl ReasoningEngine for HttpReasoningEngine {
    async fn stream_turn(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<mpsc::Receiver<Result<EngineEvent>>> {
        let url = format!("{}/chat/stream", self.config.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.config.model,
            "system": system_prompt,
            "prompt": prompt,
        });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntakeError::Engine(format!("engine request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(IntakeError::Engine(format!(
                "engine returned {}",
                resp.status()
            )));
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut resp = resp;
            let mut buffer = String::new();
            loop {
                match resp.chunk().await {
                    Ok(Some(chunk)) => {
                        buffer.push_str(&String::from_utf8_lossy(&chunk));
                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim().to_string();
                            buffer.drain(..=pos);
                            if line.is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<Value>(&line) {
                                Ok(raw) => {
                                    if let Some(event) = decode_engine_event(&raw) {
                                        if tx.send(Ok(event)).await.is_err() {
                                            return;
                                        }
                                    } else {
                                        debug!("skipping unrecognized engine event");
                                    }
                                }
                                Err(e) => {
                                    warn!(error = %e, "malformed engine event line");
                                }
                            }
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        let _ = tx
                            .send(Err(IntakeError::Engine(format!(
                                "engine stream broke: {}",
                                e
                            ))))
                            .await;
                        return;
                    }
                }
            }
        });
        Ok(rx)
    }
}

/// Deterministic engine used when no engine endpoint is configured, and in
/// tests. Replays a fixed event script.
pub struct ScriptedEngine {
    events: Vec<EngineEvent>,
}

impl ScriptedEngine {
    pub fn new(events: Vec<EngineEvent>) -> Self {
        Self { events }
    }

    /// A canned reply streamed as deltas followed by the redundant complete
    /// message, mirroring the real engine's shape.
    pub fn canned(reply: &str) -> Self {
        let mut events = Vec::new();
        for chunk in reply.split_inclusive(' ') {
            events.push(EngineEvent::ContentDelta(chunk.to_string()));
        }
        events.push(EngineEvent::Message(vec![MessageSegment::Text(
            reply.to_string(),
        )]));
        Self::new(events)
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn stream_turn(
        &self,
        _system_prompt: &str,
        _prompt: &str,
    ) -> Result<mpsc::Receiver<Result<EngineEvent>>> {
        let (tx, rx) = mpsc::channel(32);
        let events = self.events.clone();
        tokio::spawn(async move {
            for event in events {
                if tx.send(Ok(event)).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---- Decoding ----

    #[test]
    fn test_decode_data_delta() {
        let event = decode_engine_event(&json!({"data": "Hel"})).unwrap();
        assert_eq!(event, EngineEvent::ContentDelta("Hel".to_string()));
    }

    #[test]
    fn test_decode_untyped_delta() {
        let event = decode_engine_event(&json!({"delta": {"text": "lo"}})).unwrap();
        assert_eq!(event, EngineEvent::ContentDelta("lo".to_string()));
    }

    #[test]
    fn test_decode_output_text_delta() {
        let raw = json!({"delta": {
            "type": "output_text_delta",
            "delta": {"text": "Hi"}
        }});
        assert_eq!(
            decode_engine_event(&raw).unwrap(),
            EngineEvent::ContentDelta("Hi".to_string())
        );
    }

    #[test]
    fn test_decode_content_block_text_delta() {
        let raw = json!({"delta": {
            "type": "content_block_delta",
            "delta": {"type": "text_delta", "text": " there"}
        }});
        assert_eq!(
            decode_engine_event(&raw).unwrap(),
            EngineEvent::ContentDelta(" there".to_string())
        );
    }

    #[test]
    fn test_decode_stop_delta_skipped() {
        let raw = json!({"delta": {"type": "output_text_stop_delta"}});
        assert!(decode_engine_event(&raw).is_none());
    }

    #[test]
    fn test_decode_non_text_content_block_delta_skipped() {
        let raw = json!({"delta": {
            "type": "content_block_delta",
            "delta": {"type": "input_json_delta", "partial_json": "{"}
        }});
        assert!(decode_engine_event(&raw).is_none());
    }

    #[test]
    fn test_decode_reasoning_text() {
        let event = decode_engine_event(&json!({"reasoning_text": "checking"})).unwrap();
        assert_eq!(event, EngineEvent::Thinking("checking".to_string()));
    }

    #[test]
    fn test_decode_tool_use_without_input() {
        let event =
            decode_engine_event(&json!({"current_tool_use": {"name": "retrieve_university_info"}}))
                .unwrap();
        assert_eq!(
            event,
            EngineEvent::ToolUse {
                name: "retrieve_university_info".to_string(),
                input: None
            }
        );
    }

    #[test]
    fn test_decode_tool_use_with_input() {
        let raw = json!({"current_tool_use": {
            "name": "translate_text",
            "input": {"text": "hola", "target_language": "en"}
        }});
        match decode_engine_event(&raw).unwrap() {
            EngineEvent::ToolUse { name, input } => {
                assert_eq!(name, "translate_text");
                assert_eq!(input.unwrap()["text"], "hola");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_message_with_text_and_tool_result() {
        let raw = json!({"message": {"role": "assistant", "content": [
            {"text": "Here is what I found."},
            {"toolResult": {"content": [{"text": "3 programs matched"}]}}
        ]}});
        let event = decode_engine_event(&raw).unwrap();
        assert_eq!(
            event,
            EngineEvent::Message(vec![
                MessageSegment::Text("Here is what I found.".to_string()),
                MessageSegment::ToolResult("3 programs matched".to_string()),
            ])
        );
    }

    #[test]
    fn test_decode_error_event() {
        let event = decode_engine_event(&json!({"error": "overloaded"})).unwrap();
        assert_eq!(event, EngineEvent::Error("overloaded".to_string()));
    }

    #[test]
    fn test_decode_unrecognized_shape_skipped() {
        assert!(decode_engine_event(&json!({"usage": {"tokens": 12}})).is_none());
        assert!(decode_engine_event(&json!(42)).is_none());
    }

    // ---- Scripted engine ----

    #[tokio::test]
    async fn test_scripted_engine_replays_events() {
        let engine = ScriptedEngine::new(vec![
            EngineEvent::ContentDelta("Hi".to_string()),
            EngineEvent::Message(vec![MessageSegment::Text("Hi".to_string())]),
        ]);
        let mut rx = engine.stream_turn("", "Hi").await.unwrap();
        let mut count = 0;
        while let Some(event) = rx.recv().await {
            event.unwrap();
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_canned_reply_reconstructs_text() {
        let engine = ScriptedEngine::canned("Welcome to campus");
        let mut rx = engine.stream_turn("", "").await.unwrap();
        let mut deltas = String::new();
        while let Some(event) = rx.recv().await {
            if let EngineEvent::ContentDelta(d) = event.unwrap() {
                deltas.push_str(&d);
            }
        }
        assert_eq!(deltas, "Welcome to campus");
    }
}
