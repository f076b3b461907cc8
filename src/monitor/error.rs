//! Bounded monitor error types.

use std::fmt;
use std::time::Duration;

/// Errors returned by monitor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// The timed wait expired before the buffer predicate held.
    Timeout(Duration),

    /// The monitor was closed while the call was blocked (or before it started).
    Closed,
}

impl MonitorError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MonitorError::Timeout(_))
    }

    /// Check if this is a closed error.
    pub fn is_closed(&self) -> bool {
        matches!(self, MonitorError::Closed)
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Timeout(duration) => {
                write!(f, "wait timed out after {}ms", duration.as_millis())
            }
            MonitorError::Closed => {
                write!(f, "monitor has been closed")
            }
        }
    }
}

impl std::error::Error for MonitorError {}

/// Result type alias for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
