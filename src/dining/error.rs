//! Dining table error types.

use std::fmt;

/// Errors returned by dining table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table was stopped while the call was blocked (or before it started).
    Stopped,

    /// The seat index is out of range.
    InvalidSeat {
        /// The offending index.
        seat: usize,
        /// Number of seats at the table.
        seats: usize,
    },
}

impl TableError {
    /// Check if this is a stopped error.
    pub fn is_stopped(&self) -> bool {
        matches!(self, TableError::Stopped)
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Stopped => {
                write!(f, "table has been stopped")
            }
            TableError::InvalidSeat { seat, seats } => {
                write!(f, "seat {} out of range (table has {} seats)", seat, seats)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Result type alias for dining table operations.
pub type TableResult<T> = Result<T, TableError>;
