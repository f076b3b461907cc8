//! Worker pool error types.

use std::fmt;

/// Errors returned by pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Submission attempted after shutdown began.
    Rejected,

    /// A worker thread itself panicked (task panics are captured and never
    /// reach the worker; this surfaces only from join diagnostics).
    WorkerPanic(String),
}

impl PoolError {
    /// Check if this is a rejected submission.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PoolError::Rejected)
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Rejected => {
                write!(f, "pool is shutting down, task rejected")
            }
            PoolError::WorkerPanic(msg) => {
                write!(f, "worker panicked: {}", msg)
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
