//! Structured logging bootstrap.
//!
//! Thin wiring over the tracing-subscriber ecosystem: every dispatch
//! emits structured events (request payloads, commit latencies, cache
//! activity) and this module installs a subscriber for them.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Error type for logging bootstrap failures.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The subscriber could not be installed.
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level filter (e.g., "info", "hermes_dispatch=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true, // JSON by default for production
            span_events: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            include_target: true,
        }
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] when the level filter is
/// invalid or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}
