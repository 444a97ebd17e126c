//! Logging utilities for the Gatehouse tools.
//!
//! Provides a single place to initialise the tracing subscriber so every binary
//! formats its logs the same way.

use gatehouse_config::LoggingConfig;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber from the `logging` config section.
///
/// An unrecognised level name falls back to INFO.
pub fn init_from_config(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    init_with_level(level);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives are honoured in addition to `gatehouse=<level>`.
/// Calling this more than once is harmless.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("gatehouse={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    // try_init: a global default subscriber may already be set (tests)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
