//! Bounded-buffer monitor.
//!
//! A fixed-capacity circular buffer guarded by one mutex and two condition
//! variables, with timed operations and advisory diagnostics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   BoundedMonitor<T>                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ producers ──insert()──► ┌───┬───┬───┬───┐ ──remove()──► │
//! │   (block on not_full)   │   │ x │ x │   │  consumers    │
//! │                         └───┴───┴───┴───┘ (block on     │
//! │                          head ──► tail     not_empty)   │
//! │                                                         │
//! │ waiter map ──► deadlock warnings, priority inheritance  │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod buffer;
mod error;

pub use buffer::{BoundedMonitor, DEFAULT_DEADLOCK_THRESHOLD};
pub use error::{MonitorError, MonitorResult};

use serde::Serialize;

/// Snapshot of monitor counters and derived rates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStats {
    /// Buffer slot count.
    pub capacity: usize,
    /// Occupied slots at snapshot time.
    pub len: usize,
    /// Callers blocked at snapshot time.
    pub waiters: usize,
    /// Successful insertions.
    pub insertions: u64,
    /// Successful removals.
    pub removals: u64,
    /// Timed waits that expired.
    pub timeouts: u64,
    /// Priority-inheritance events recorded.
    pub priority_inheritances: u64,
    /// Running mean wait of successful operations, in seconds.
    pub avg_wait_secs: f64,
    /// Seconds since the monitor was constructed.
    pub elapsed_secs: f64,
    /// (insertions + removals) / elapsed_secs.
    pub ops_per_sec: f64,
}
