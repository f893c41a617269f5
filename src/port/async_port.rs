//! Async serial port implementation using tokio-serial.
//!
//! The line is always configured 8N1 without flow control; only the device
//! path and speed vary. Modem control lines are driven directly through the
//! `TIOCM*` ioctls on unix, and through the serialport pin accessors elsewhere.

use super::error::PortError;
use super::traits::{AsyncSerialPortAdapter, ModemControl};
use crate::config::PortConfig;
use crate::modem::ModemSignals;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Native async serial port implementation using tokio-serial.
pub struct TokioSerialPort {
    /// The underlying tokio-serial stream.
    inner: tokio_serial::SerialStream,
    /// Port name/path for identification.
    name: String,
    baud_rate: u32,
}

impl TokioSerialPort {
    /// Open and configure the device named in `config`.
    ///
    /// # Example
    /// ```no_run
    /// use serial_echo::config::PortConfig;
    /// use serial_echo::port::TokioSerialPort;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = PortConfig::new("/dev/ttyUSB0", 9600)?;
    /// let port = TokioSerialPort::open(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(config: &PortConfig) -> Result<Self, PortError> {
        let port_name = config.path();
        let builder = tokio_serial::new(port_name, config.baud_rate())
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None);

        let inner = tokio_serial::SerialStream::open(&builder).map_err(|e| match e.kind {
            tokio_serial::ErrorKind::NoDevice => PortError::not_found(port_name),
            tokio_serial::ErrorKind::InvalidInput => PortError::config(e.to_string()),
            _ => PortError::Serial(e),
        })?;

        Ok(Self {
            inner,
            name: port_name.to_string(),
            baud_rate: config.baud_rate(),
        })
    }
}

#[async_trait]
impl AsyncSerialPortAdapter for TokioSerialPort {
    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.inner.read(buffer).await.map_err(PortError::Io)
    }

    async fn write_all_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.inner.write_all(data).await.map_err(PortError::Io)?;
        Ok(data.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(unix)]
mod lines {
    use super::*;
    use std::os::unix::io::AsRawFd;

    /// Our bit layout against the platform's `TIOCM_*` values.
    const TIOCM_MAP: [(ModemSignals, libc::c_int); 9] = [
        (ModemSignals::LE, libc::TIOCM_LE),
        (ModemSignals::DTR, libc::TIOCM_DTR),
        (ModemSignals::RTS, libc::TIOCM_RTS),
        (ModemSignals::ST, libc::TIOCM_ST),
        (ModemSignals::SR, libc::TIOCM_SR),
        (ModemSignals::CTS, libc::TIOCM_CTS),
        (ModemSignals::CAR, libc::TIOCM_CAR),
        (ModemSignals::RNG, libc::TIOCM_RNG),
        (ModemSignals::DSR, libc::TIOCM_DSR),
    ];

    fn from_raw(raw: libc::c_int) -> ModemSignals {
        TIOCM_MAP
            .iter()
            .filter(|(_, bit)| raw & bit != 0)
            .fold(ModemSignals::empty(), |acc, (signal, _)| acc | *signal)
    }

    fn to_raw(signals: ModemSignals) -> libc::c_int {
        TIOCM_MAP
            .iter()
            .filter(|(signal, _)| signals.contains(*signal))
            .fold(0, |acc, (_, bit)| acc | bit)
    }

    impl ModemControl for TokioSerialPort {
        fn read_modem_bits(&mut self) -> Result<ModemSignals, PortError> {
            let mut bits: libc::c_int = 0;
            // SAFETY: the fd is owned by `inner` and stays open for this call;
            // TIOCMGET writes a single c_int through the pointer.
            let rc = unsafe { libc::ioctl(self.inner.as_raw_fd(), libc::TIOCMGET as _, &mut bits) };
            if rc < 0 {
                return Err(PortError::Io(std::io::Error::last_os_error()));
            }
            Ok(from_raw(bits))
        }

        fn set_modem_bits(&mut self, signals: ModemSignals, raised: bool) -> Result<(), PortError> {
            let bits = to_raw(signals);
            let request = if raised { libc::TIOCMBIS } else { libc::TIOCMBIC };
            // SAFETY: as above; TIOCMBIS/TIOCMBIC only read the c_int.
            let rc = unsafe { libc::ioctl(self.inner.as_raw_fd(), request as _, &bits) };
            if rc < 0 {
                return Err(PortError::Io(std::io::Error::last_os_error()));
            }
            Ok(())
        }
    }

}

#[cfg(not(unix))]
mod lines {
    use super::*;
    use serialport::SerialPort;

    impl ModemControl for TokioSerialPort {
        fn read_modem_bits(&mut self) -> Result<ModemSignals, PortError> {
            let mut bits = ModemSignals::empty();
            if self.inner.read_clear_to_send()? {
                bits |= ModemSignals::CTS;
            }
            if self.inner.read_data_set_ready()? {
                bits |= ModemSignals::DSR;
            }
            if self.inner.read_carrier_detect()? {
                bits |= ModemSignals::CAR;
            }
            if self.inner.read_ring_indicator()? {
                bits |= ModemSignals::RNG;
            }
            Ok(bits)
        }

        fn set_modem_bits(&mut self, signals: ModemSignals, raised: bool) -> Result<(), PortError> {
            if signals.contains(ModemSignals::RTS) {
                self.inner.write_request_to_send(raised)?;
            }
            if signals.contains(ModemSignals::DTR) {
                self.inner.write_data_terminal_ready(raised)?;
            }
            Ok(())
        }
    }
}

impl std::fmt::Debug for TokioSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}
