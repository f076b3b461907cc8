//! Logging configuration.

use super::parse::env_bool;
use super::ConfigError;

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Emit JSON-formatted log lines instead of the plain format.
    pub json: bool,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: conclave=debug
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Self::resolve_log_filter(),
            json: env_bool("LOG_JSON", false),
        })
    }

    /// Resolve log filter from environment.
    fn resolve_log_filter() -> String {
        // 1. Check LOG_LEVEL first (simple: debug, info, warn, error)
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("conclave={}", level);
                }
                _ => {
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        // 2. Check RUST_LOG (full tracing filter syntax)
        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        // 3. Default
        "conclave=info".to_string()
    }
}
