//! Log subscriber setup
//!
//! `RUST_LOG` wins over the configured level when set.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingSettings};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Initialization error: {0}")]
    InitError(String),
}

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level).map_err(|e| LoggingError::InvalidFilter {
        directive: settings.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for CLI output.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = build_filter(settings)?;

    let result = match settings.format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let settings = LoggingSettings {
            level: "slack_mcp=debug,info".to_string(),
            format: LogFormat::Text,
        };
        assert!(build_filter(&settings).is_ok());
    }

    #[test]
    fn test_init_twice_reports_error() {
        let settings = LoggingSettings::default();
        // another test may have installed a subscriber first; the second call must fail either way
        let _ = init_logging(&settings);
        assert!(matches!(
            init_logging(&settings),
            Err(LoggingError::InitError(_))
        ));
    }
}
