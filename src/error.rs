//! Error handling

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Reputation target was empty or whitespace
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Operation abandoned because the engine is shutting down
    #[error("Engine is shutting down")]
    ShuttingDown,

    /// Command facade used before `init`
    #[error("Engine not initialized")]
    NotInitialized,

    /// Reputation denylist could not be compiled
    #[error("Invalid denylist: {0}")]
    Denylist(#[from] regex::Error),

    /// Audit trail could not be written
    #[error("Audit trail error: {0}")]
    Audit(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Validation failures are caller mistakes, not engine faults
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::InvalidTarget(_))
    }
}
