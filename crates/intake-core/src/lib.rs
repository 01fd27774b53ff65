//! Intake core crate - shared types, configuration, errors, and identity
//! normalization for the admissions intake pipeline.

pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod types;

pub use config::IntakeConfig;
pub use error::{IntakeError, Result};
pub use events::{Role, TurnEvent, TurnRequest};
pub use identity::normalize_actor_id;
pub use types::*;
