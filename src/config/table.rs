//! Dining table configuration.

use std::num::NonZeroUsize;

use super::parse::env_parse;
use super::ConfigError;

/// Dining table configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct TableConfig {
    /// Philosopher count (never zero).
    seats: NonZeroUsize,
    /// Meals each philosopher eats before finishing (None = run forever).
    pub max_meals: Option<u64>,
}

impl TableConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let seats: usize = env_parse("PHILOSOPHERS", 5)?;
        let seats = NonZeroUsize::new(seats).ok_or_else(|| ConfigError::Invalid {
            key: "PHILOSOPHERS".into(),
            message: "philosopher count cannot be zero".into(),
        })?;

        // 0 means unbounded.
        let max_meals: u64 = env_parse("MAX_MEALS", 3)?;
        let max_meals = (max_meals > 0).then_some(max_meals);

        Ok(Self { seats, max_meals })
    }

    /// Get seat count (pre-validated, zero-cost).
    #[inline]
    pub fn seats(&self) -> usize {
        self.seats.get()
    }
}
