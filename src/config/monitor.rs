//! Bounded monitor configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use super::parse::{env_duration, env_parse};
use super::ConfigError;

/// Monitor configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Buffer slot count (never zero).
    capacity: NonZeroUsize,
    /// Threshold for the advisory deadlock warning.
    pub deadlock_threshold: Duration,
    /// Default timeout applied by demo callers (None = wait indefinitely).
    pub default_timeout: Option<Duration>,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let capacity: usize = env_parse("BUFFER_CAPACITY", 10)?;
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| ConfigError::Invalid {
            key: "BUFFER_CAPACITY".into(),
            message: "buffer capacity cannot be zero".into(),
        })?;

        let deadlock_threshold =
            env_duration("DEADLOCK_THRESHOLD", "5s")?.unwrap_or(Duration::from_secs(5));
        let default_timeout = env_duration("DEFAULT_TIMEOUT", "1s")?;

        Ok(Self {
            capacity,
            deadlock_threshold,
            default_timeout,
        })
    }

    /// Get buffer capacity (pre-validated, zero-cost).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
