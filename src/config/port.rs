//! Validated, immutable port parameters handed to the transfer engine.

use super::error::{ConfigError, ConfigResult};
use super::schema::{SerialConfig, DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE};
use crate::modem::FlowStrategy;
use std::fmt;

/// Diagnostic verbosity of the echo cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebugLevel {
    #[default]
    Silent,
    Verbose,
}

impl DebugLevel {
    pub fn is_verbose(self) -> bool {
        self == Self::Verbose
    }
}

impl TryFrom<u8> for DebugLevel {
    type Error = ConfigError;

    fn try_from(level: u8) -> ConfigResult<Self> {
        match level {
            0 => Ok(Self::Silent),
            1 => Ok(Self::Verbose),
            other => Err(ConfigError::validation(
                "serial.debug_level",
                format!("expected 0 (none) or 1 (full), got {other}"),
            )),
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("0"),
            Self::Verbose => f.write_str("1"),
        }
    }
}

/// Everything the engine needs to open and drive one serial device.
///
/// Fields are only reachable through getters: once built, a `PortConfig`
/// never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    path: String,
    baud_rate: u32,
    frame_size: usize,
    debug_level: DebugLevel,
    flow_strategy: FlowStrategy,
}

impl PortConfig {
    /// Validate the two required values; everything else takes its default.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> ConfigResult<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(ConfigError::validation("serial.port", "device path is empty"));
        }
        if baud_rate == 0 {
            return Err(ConfigError::validation(
                "serial.baud_rate",
                "baud rate must be positive",
            ));
        }

        Ok(Self {
            path,
            baud_rate,
            frame_size: DEFAULT_FRAME_SIZE,
            debug_level: DebugLevel::default(),
            flow_strategy: FlowStrategy::default(),
        })
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> ConfigResult<Self> {
        if frame_size == 0 {
            return Err(ConfigError::validation(
                "serial.frame_size",
                "frame size must be positive",
            ));
        }
        if frame_size > MAX_FRAME_SIZE {
            return Err(ConfigError::validation(
                "serial.frame_size",
                format!("frame size {frame_size} exceeds the {MAX_FRAME_SIZE} byte limit"),
            ));
        }
        self.frame_size = frame_size;
        Ok(self)
    }

    pub fn with_debug_level(mut self, debug_level: DebugLevel) -> Self {
        self.debug_level = debug_level;
        self
    }

    pub fn with_flow_strategy(mut self, flow_strategy: FlowStrategy) -> Self {
        self.flow_strategy = flow_strategy;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn debug_level(&self) -> DebugLevel {
        self.debug_level
    }

    pub fn flow_strategy(&self) -> FlowStrategy {
        self.flow_strategy
    }
}

impl TryFrom<&SerialConfig> for PortConfig {
    type Error = ConfigError;

    fn try_from(serial: &SerialConfig) -> ConfigResult<Self> {
        let path = serial
            .port
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired("serial.port".to_string()))?;
        let baud_rate = serial
            .baud_rate
            .ok_or_else(|| ConfigError::MissingRequired("serial.baud_rate".to_string()))?;

        Ok(Self::new(path, baud_rate)?
            .with_frame_size(serial.frame_size)?
            .with_debug_level(DebugLevel::try_from(serial.debug_level)?)
            .with_flow_strategy(serial.flow_control))
    }
}
