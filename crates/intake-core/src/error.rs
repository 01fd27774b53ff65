use thiserror::Error;

/// Top-level error type for the intake pipeline.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for IntakeError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for IntakeError {
    fn from(err: toml::de::Error) -> Self {
        IntakeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;
