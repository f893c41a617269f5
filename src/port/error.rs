//! Port-specific error types.
//!
//! Kept separate from the crate-level [`EchoError`](crate::error::EchoError) so
//! the port layer can be reused and mocked without knowing about the echo cycle.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error of kind `Other` carrying `message`.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Whether this error came from rejected line settings rather than a
    /// missing or unusable device.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Serial(e) => e.kind() == serialport::ErrorKind::InvalidInput,
            _ => false,
        }
    }
}
