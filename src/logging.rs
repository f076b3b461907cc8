//! Logging initialization.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. `init` wires up an env-filtered fmt subscriber, optionally
//! in JSON mode.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// Must be called at most once, before any component is constructed.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("conclave=info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
