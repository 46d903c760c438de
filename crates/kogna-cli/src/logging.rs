// crates/kogna-cli/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Installs the global tracing subscriber.
// Purpose: Route structured events to stderr as text or JSON.
// Dependencies: kogna-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! Events are filtered by an [`EnvFilter`] built from `logging.level`
//! (already overridden by `KOGNA_LOG` during config load) and written to
//! stderr so stdout stays reserved for command output.

use kogna_config::LogFormat;
use kogna_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directive did not parse.
    #[error("invalid log filter {filter:?}: {message}")]
    Filter {
        /// Rejected directive.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("log subscriber init failed: {0}")]
    Init(String),
}

/// Parses a filter directive such as `info` or `kogna_factory=debug,warn`.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the directive is malformed.
pub fn env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(level.trim()).map_err(|err| LoggingError::Filter {
        filter: level.to_string(),
        message: err.to_string(),
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = env_filter(&config.level)?;
    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true);
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| LoggingError::Init(err.to_string()))
}
