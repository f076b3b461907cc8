//! conclave - classic blocking concurrency components.
//!
//! This crate consolidates three invariant-driven concurrency patterns into
//! one library, all built on the same discipline: a single mutex per
//! component, condition variables, and predicate-guarded wait loops that
//! re-check their condition after every wake.
//!
//! # Components
//!
//! - [`BoundedMonitor`] - fixed-capacity circular buffer with timed
//!   insert/remove, deadlock-warning diagnostics and priority-inheritance
//!   bookkeeping
//! - [`DiningTable`] - deadlock-free dining philosophers protocol with
//!   per-seat condition variables
//! - [`WorkerPool`] - fixed worker threads over a bounded FIFO task queue
//!   with backpressure, graceful drain-then-exit shutdown and per-task fault
//!   isolation
//!
//! The components do not call into one another; each owns its shared state
//! exclusively and touches it only under its own lock. No lock is ever held
//! while a task executes.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use conclave::BoundedMonitor;
//!
//! let monitor = Arc::new(BoundedMonitor::new(10));
//! monitor.insert(42, Some(Duration::from_secs(1)))?;
//! let item = monitor.remove(Some(Duration::from_secs(1)))?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod dining;
pub mod logging;
pub mod monitor;
pub mod pool;

// Re-exports for convenience
pub use config::Config;
pub use dining::{DiningTable, PhilosopherState, TableError, TableStats};
pub use monitor::{BoundedMonitor, MonitorError, MonitorStats};
pub use pool::{PoolError, PoolStats, WorkerPool};
