//! Logging system setup and configuration
//!
//! This module handles the initialization of the tracing-based logging system.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Initialize the logging system
///
/// Sets up structured logging using the tracing crate. The configured level
/// is used unless `RUST_LOG` is set, in which case the environment wins.
///
/// # Environment Variables
/// * `RUST_LOG` - Override the default logging filter (e.g., "debug", "plugin_whitelist=trace")
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}
