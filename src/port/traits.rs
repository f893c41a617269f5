//! Core traits for serial port abstraction.
//!
//! The echo cycle needs two capabilities from a port: moving bytes
//! ([`AsyncSerialPortAdapter`]) and touching the modem control lines
//! ([`ModemControl`]). Real ports and the mock implement both, so the engine
//! can be driven without hardware.

use super::error::PortError;
use crate::modem::ModemSignals;
use async_trait::async_trait;

/// Async byte I/O on an open serial port.
///
/// Note: This trait requires `Send` but not `Sync` because serial ports
/// are accessed exclusively by their owning task.
#[async_trait]
pub trait AsyncSerialPortAdapter: Send {
    /// Read up to `buffer.len()` bytes, waiting until at least one arrives.
    ///
    /// Returns the number of bytes actually read. Zero means the device hung up.
    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Write all of `data` to the port.
    ///
    /// Returns the number of bytes written, which is always `data.len()` on success.
    async fn write_all_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;
}

/// Access to the modem control-line register of a port.
///
/// Both operations are single ioctl-class calls that never wait on the line,
/// so they are synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait ModemControl {
    /// Read the current control-line bitmask.
    fn read_modem_bits(&mut self) -> Result<ModemSignals, PortError>;

    /// Assert (`raised == true`) or clear every line in `signals`.
    fn set_modem_bits(&mut self, signals: ModemSignals, raised: bool) -> Result<(), PortError>;
}

/// A port the transfer engine can own: byte I/O plus control lines.
pub trait EchoPort: AsyncSerialPortAdapter + ModemControl {}

impl<T: AsyncSerialPortAdapter + ModemControl> EchoPort for T {}
