//! Generic worker pool infrastructure.
//!
//! The producer/consumer pattern generalized to arbitrary callables: any
//! number of producers submit boxed jobs into a bounded FIFO queue, a fixed
//! set of worker threads drains it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     WorkerPool                         │
//! ├────────────────────────────────────────────────────────┤
//! │ producers ──submit()──► ┌──────────────┐               │
//! │  (block on not_full)    │ bounded queue │               │
//! │                         └──────┬───────┘               │
//! │                                │ (not_empty)           │
//! │              ┌─────────┬───────┴──┬─────────┐          │
//! │              │ worker0 │ worker1  │ worker2 │  ...     │
//! │              └─────────┴──────────┴─────────┘          │
//! │   shutdown: stop intake, drain queue, join workers     │
//! └────────────────────────────────────────────────────────┘
//! ```

mod error;
mod worker;

pub use error::{PoolError, PoolResult};
pub use worker::WorkerPool;

use serde::Serialize;

/// Snapshot of pool queue counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolStats {
    /// Worker thread count.
    pub workers: usize,
    /// Queue capacity.
    pub capacity: usize,
    /// Tasks queued at snapshot time.
    pub queue_len: usize,
    /// Tasks accepted by submit.
    pub submitted: u64,
    /// Tasks that ran to completion.
    pub completed: u64,
    /// Tasks that returned an error or panicked.
    pub failed: u64,
    /// Submissions rejected after shutdown began.
    pub rejected: u64,
    /// Running mean time tasks spent queued, in seconds.
    pub avg_queue_wait_secs: f64,
}
