//! Worker pool configuration.

use std::num::NonZeroUsize;

use super::parse::env_parse;
use super::ConfigError;

/// Default queue capacity multiplier per worker.
const DEFAULT_QUEUE_MULTIPLIER: usize = 100;

/// Pool configuration loaded from environment.
///
/// All values are pre-computed at construction time for zero-cost access.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Resolved worker count (never zero).
    workers: NonZeroUsize,
    /// Resolved queue capacity (never zero).
    queue_capacity: NonZeroUsize,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let workers = Self::parse_workers()?;
        let queue_capacity = Self::parse_queue_capacity(workers)?;
        Ok(Self {
            workers,
            queue_capacity,
        })
    }

    /// Get worker count (pre-computed, zero-cost).
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Get queue capacity (pre-computed, zero-cost).
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.get()
    }

    fn parse_workers() -> Result<NonZeroUsize, ConfigError> {
        let workers: usize = env_parse("WORKERS", 0)?;

        // Resolve 0 to CPU count
        let count = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };

        NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: "WORKERS".into(),
            message: "worker count cannot be zero".into(),
        })
    }

    fn parse_queue_capacity(workers: NonZeroUsize) -> Result<NonZeroUsize, ConfigError> {
        let capacity: usize = env_parse("QUEUE_CAPACITY", 0)?;

        // Resolve 0 to workers * 100
        let count = if capacity == 0 {
            workers.get() * DEFAULT_QUEUE_MULTIPLIER
        } else {
            capacity
        };

        NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: "QUEUE_CAPACITY".into(),
            message: "queue capacity cannot be zero".into(),
        })
    }
}
