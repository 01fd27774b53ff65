//! Conversation turn engine: prompt composition, reasoning-engine streaming,
//! event aggregation, and tool dispatch.

pub mod aggregator;
pub mod engine;
pub mod prompt;
pub mod tools;
pub mod turn;

pub use aggregator::TurnAggregator;
pub use engine::{
    decode_engine_event, EngineEvent, HttpReasoningEngine, MessageSegment, ReasoningEngine,
    ScriptedEngine,
};
pub use tools::ToolSet;
pub use turn::TurnRunner;
