//! Logging installation.
//!
//! `RUST_LOG` always wins; otherwise the filter comes from `[logging] level`.
//! Diagnostic lines of the echo cycle go to stdout; warnings and the fatal
//! report go to stderr.

use crate::config::{ConfigError, ConfigResult, LogFormat, LoggingConfig};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Build the filter for `config`, preferring `RUST_LOG` when it is set.
pub fn build_filter(config: &LoggingConfig) -> ConfigResult<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::validation("logging.level", e.to_string()))
    })
}

/// Install the global subscriber. Call once, first thing in `main`.
///
/// # Errors
///
/// If the level directive is invalid, or a subscriber is already installed.
pub fn install(config: &LoggingConfig) -> ConfigResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::WARN)
                .or_else(std::io::stdout),
        );

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
    };

    installed.map_err(|e| ConfigError::validation("logging", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_rejects_bad_level() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "serial_echo=loud".to_string(),
            ..LoggingConfig::default()
        };

        let err = build_filter(&config).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    #[serial]
    fn test_accepts_directives() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "info,serial_echo::diag=debug".to_string(),
            ..LoggingConfig::default()
        };

        assert!(build_filter(&config).is_ok());
    }
}
