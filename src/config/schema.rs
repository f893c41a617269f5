//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! Every section has defaults so a partial file is always valid TOML input;
//! required values are checked later, when the [`PortConfig`](super::PortConfig)
//! is built.

use crate::modem::FlowStrategy;
use serde::{Deserialize, Serialize};

/// Default frame size in bytes.
pub const DEFAULT_FRAME_SIZE: usize = 12;

/// Largest accepted frame size in bytes.
pub const MAX_FRAME_SIZE: usize = 4096;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial port configuration
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serial port configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path. Required, there is no portable default.
    pub port: Option<String>,
    /// Line speed. Required, deployments disagree on a default.
    pub baud_rate: Option<u32>,
    /// Largest single transfer in bytes
    pub frame_size: usize,
    /// 0 for silent, 1 for verbose diagnostics
    pub debug_level: u8,
    /// RTS handling between transfers
    pub flow_control: FlowStrategy,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: None,
            frame_size: DEFAULT_FRAME_SIZE,
            debug_level: 0,
            flow_control: FlowStrategy::default(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter directive: "trace", "debug", "info", "warn", "error", or a full `EnvFilter` string
    pub level: String,
    /// Log format: "pretty", "compact", "full"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line format with colors
    #[default]
    Pretty,
    /// Single-line compact format
    Compact,
    /// Single-line format with all span fields
    Full,
}
