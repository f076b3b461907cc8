//! Configuration module for conclave.
//!
//! Centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use conclave::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Buffer capacity: {}", config.monitor.capacity());
//! println!("Workers: {}", config.pool.workers());
//! ```

mod error;
mod logging;
mod monitor;
mod parse;
mod pool;
mod table;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use monitor::MonitorConfig;
pub use pool::PoolConfig;
pub use table::TableConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bounded monitor configuration.
    pub monitor: MonitorConfig,
    /// Dining table configuration.
    pub table: TableConfig,
    /// Worker pool configuration.
    pub pool: PoolConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            monitor: MonitorConfig::from_env()?,
            table: TableConfig::from_env()?,
            pool: PoolConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Buffer capacity: {}", self.monitor.capacity());
        info!(
            "  Deadlock threshold: {}ms",
            self.monitor.deadlock_threshold.as_millis()
        );
        match self.monitor.default_timeout {
            Some(t) => info!("  Default timeout: {}ms", t.as_millis()),
            None => info!("  Default timeout: disabled"),
        }
        info!("  Philosophers: {}", self.table.seats());
        match self.table.max_meals {
            Some(m) => info!("  Max meals: {}", m),
            None => info!("  Max meals: unbounded"),
        }
        info!("  Workers: {}", self.pool.workers());
        info!("  Queue capacity: {}", self.pool.queue_capacity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        // Clear all env vars that might affect the test
        std::env::remove_var("BUFFER_CAPACITY");
        std::env::remove_var("DEADLOCK_THRESHOLD");
        std::env::remove_var("DEFAULT_TIMEOUT");
        std::env::remove_var("PHILOSOPHERS");
        std::env::remove_var("MAX_MEALS");
        std::env::remove_var("WORKERS");
        std::env::remove_var("QUEUE_CAPACITY");

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.monitor.capacity(), 10);
        assert_eq!(
            config.monitor.deadlock_threshold,
            std::time::Duration::from_secs(5)
        );
        assert_eq!(
            config.monitor.default_timeout,
            Some(std::time::Duration::from_secs(1))
        );
        assert_eq!(config.table.seats(), 5);
        assert_eq!(config.table.max_meals, Some(3));
        assert!(config.pool.workers() >= 1); // Auto-detected from CPU count
        assert_eq!(config.pool.queue_capacity(), config.pool.workers() * 100);
    }
}
