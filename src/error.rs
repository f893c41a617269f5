//! Unified error type for the echo service.
//!
//! Every variant is fatal: nothing is retried, and the error unwinds to `main`
//! which reports it and exits.

use crate::config::ConfigError;
use crate::diagnostic::Direction;
use crate::modem::ModemSignals;
use crate::port::PortError;
use std::error::Error as StdError;
use thiserror::Error;

/// A specialized `Result` type for the echo service.
pub type EchoResult<T> = Result<T, EchoError>;

#[derive(Debug, Error)]
pub enum EchoError {
    /// Bad path, baud rate or line options, found at startup.
    #[error("Configuration rejected: {reason}")]
    ConfigurationRejected {
        reason: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The device could not be opened.
    #[error("Port unavailable: {path}")]
    PortUnavailable {
        path: String,
        #[source]
        source: PortError,
    },

    /// Reading the control-line register failed.
    #[error("Failed to query modem signals")]
    SignalQueryFailed(#[source] PortError),

    /// Asserting or clearing a control line failed.
    #[error("{} couldn't be {}", .signal.label(), set_or_cleared(.raised))]
    SignalSetFailed {
        signal: ModemSignals,
        raised: bool,
        #[source]
        source: PortError,
    },

    /// A read or write on the line failed.
    #[error("{direction} transfer failed")]
    TransferFailed {
        direction: Direction,
        #[source]
        source: PortError,
    },
}

impl EchoError {
    /// Reject configuration with a plain reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::ConfigurationRejected {
            reason: reason.into(),
            source: None,
        }
    }

    /// Map an open failure to the startup taxonomy: rejected line settings are
    /// a configuration problem, everything else means the device is unusable.
    pub fn from_open(path: &str, err: PortError) -> Self {
        if err.is_config() {
            Self::ConfigurationRejected {
                reason: format!("line settings for {path} were refused"),
                source: Some(Box::new(err)),
            }
        } else {
            Self::PortUnavailable {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// The error followed by its whole source chain, for the final report.
    ///
    /// Platform error codes surface here through the `std::io::Error` at the
    /// bottom of the chain.
    pub fn report(&self) -> String {
        let mut text = format!("[ERROR]: {self}");
        let mut source = self.source();
        while let Some(cause) = source {
            // Wrappers often repeat their source in their own message.
            let cause_text = cause.to_string();
            if !text.ends_with(&cause_text) {
                text.push_str(": ");
                text.push_str(&cause_text);
            }
            source = cause.source();
        }
        text
    }
}

fn set_or_cleared(raised: &bool) -> &'static str {
    if *raised {
        "set"
    } else {
        "cleared"
    }
}

impl From<ConfigError> for EchoError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigurationRejected {
            reason: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
