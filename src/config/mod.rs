//! Configuration module for serial-echo.
//!
//! This module provides TOML-based configuration with environment variable
//! overrides, and the validated [`PortConfig`] the engine consumes.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SERIAL_ECHO_CONFIG` environment variable (explicit path)
//! 2. `./serial-echo.toml` (current directory)
//! 3. `~/.config/serial-echo/config.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\serial-echo\config.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Any configuration value can be overridden via environment variables.
//! The pattern is: `SERIAL_ECHO_<SECTION>_<KEY>`
//!
//! Examples:
//! - `SERIAL_ECHO_SERIAL_PORT=/dev/ttyS1`
//! - `SERIAL_ECHO_SERIAL_BAUD_RATE=9600`
//! - `SERIAL_ECHO_SERIAL_DEBUG_LEVEL=1`
//!
//! # Example
//!
//! ```rust,no_run
//! use serial_echo::config::{ConfigLoader, PortConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ConfigLoader::load()?;
//! let port_config = PortConfig::try_from(&loader.config().serial)?;
//! println!("Echoing on {} at {} baud", port_config.path(), port_config.baud_rate());
//! # Ok(())
//! # }
//! ```

mod error;
mod loader;
mod port;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{get_default_config_path, resolve_config_path, ConfigLoader};
pub use port::{DebugLevel, PortConfig};
pub use schema::{
    Config, LogFormat, LoggingConfig, SerialConfig, DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE,
};
