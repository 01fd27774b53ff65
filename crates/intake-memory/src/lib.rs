//! Intake memory crate - SQLite-backed session ledger and conversation memory.
//!
//! Provides the durable stores the turn orchestrator relies on: the session
//! ledger (which sessions a contact has been seen in) and the conversation
//! memory gateway (append turns, fetch bounded recent history). Both follow
//! a best-effort policy at the gateway boundary: history is an optimization,
//! not a correctness requirement, so store failures are logged and absorbed
//! rather than propagated into the conversational path.

pub mod db;
pub mod gateway;
pub mod ledger;
pub mod store;

pub use db::Database;
pub use gateway::MemoryGateway;
pub use ledger::{SessionLedger, TrackOutcome};
pub use store::{MemoryStore, SqliteMemoryStore};
