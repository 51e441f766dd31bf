use thiserror::Error;

use crate::engine::domain::inference_engine::EngineError;

/// Failure to load an engine into the pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Every slot is occupied; construction was not attempted.
    #[error("no free engine slot")]
    PoolExhausted,
    #[error("engine construction failed: {0}")]
    Construction(#[from] EngineError),
}

/// Rejected transcription submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscribeError {
    #[error("handle {0} is out of range")]
    InvalidHandle(usize),
    #[error("slot {0} has no engine loaded")]
    UnoccupiedHandle(usize),
}

impl TranscribeError {
    /// Wire status code for host bindings layered on top:
    /// -1 out of range, -2 unoccupied.
    pub fn status_code(&self) -> i32 {
        match self {
            TranscribeError::InvalidHandle(_) => -1,
            TranscribeError::UnoccupiedHandle(_) => -2,
        }
    }
}
