//! Error types for wordeasy-core.

use thiserror::Error;

use crate::types::WordId;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised by a word catalog or progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The progress row changed between read and write.
    #[error("concurrent update on word {0}")]
    Conflict(WordId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the scheduler.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("word {0} not found")]
    NotFound(WordId),

    #[error("invalid attempt: {0}")]
    Validation(String),

    /// Write contention outlived the retry budget. Transient; callers may retry.
    #[error("word {word_id} still contended after {attempts} attempts")]
    Conflict { word_id: WordId, attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
