//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware: queued inbound bytes, a log of outbound writes,
//! a modem line register, and one-shot fault injection for every operation.

use super::error::PortError;
use super::traits::{AsyncSerialPortAdapter, ModemControl};
use crate::modem::ModemSignals;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all bytes written to the port.
    write_log: Vec<Vec<u8>>,
    /// Current state of the control lines.
    lines: ModemSignals,
    /// Scripted register readings, served before `lines`.
    scripted_readings: VecDeque<ModemSignals>,
    /// Every set/clear request, in order.
    signal_log: Vec<(ModemSignals, bool)>,
    /// Number of register reads performed.
    modem_reads: usize,
    fail_next_read: bool,
    fail_next_write: bool,
    fail_next_modem_read: bool,
    fail_next_modem_set: bool,
    /// Next read reports a hang-up (zero bytes).
    hang_up: bool,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test keeps one handle while the engine owns the
/// other. Reads wait for data like a real idle line instead of failing.
///
/// # Example
/// ```
/// use serial_echo::port::{AsyncSerialPortAdapter, MockSerialPort};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello, World!");
///
/// let mut buffer = [0u8; 5];
/// let n = port.read_bytes(&mut buffer).await.unwrap();
/// assert_eq!(&buffer[..n], b"Hello");
///
/// port.write_all_bytes(b"Hello").await.unwrap();
/// assert_eq!(port.get_write_log(), vec![b"Hello".to_vec()]);
/// # }
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    /// The port name/identifier.
    name: String,
    state: Arc<Mutex<MockPortState>>,
    data_ready: Arc<Notify>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
            data_ready: Arc::new(Notify::new()),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
        self.data_ready.notify_one();
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Get the number of bytes still waiting to be read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// Set the control lines as seen by the next register reads.
    pub fn set_lines(&self, lines: ModemSignals) {
        self.state.lock().lines = lines;
    }

    /// Current control lines, including changes made through `set_modem_bits`.
    pub fn lines(&self) -> ModemSignals {
        self.state.lock().lines
    }

    /// Queue one register reading that takes precedence over the line state.
    pub fn script_reading(&self, reading: ModemSignals) {
        self.state.lock().scripted_readings.push_back(reading);
    }

    /// All set/clear requests seen so far.
    pub fn signal_log(&self) -> Vec<(ModemSignals, bool)> {
        self.state.lock().signal_log.clone()
    }

    /// Number of control-register reads performed.
    pub fn modem_reads(&self) -> usize {
        self.state.lock().modem_reads
    }

    /// Make the next read fail with an I/O error.
    pub fn fail_next_read(&self) {
        self.state.lock().fail_next_read = true;
        self.data_ready.notify_one();
    }

    /// Make the next write fail with an I/O error.
    pub fn fail_next_write(&self) {
        self.state.lock().fail_next_write = true;
    }

    /// Make the next control-register read fail.
    pub fn fail_next_modem_read(&self) {
        self.state.lock().fail_next_modem_read = true;
    }

    /// Make the next set/clear request fail.
    pub fn fail_next_modem_set(&self) {
        self.state.lock().fail_next_modem_set = true;
    }

    /// Make the next read return zero bytes, as a hung-up device does.
    pub fn hang_up(&self) {
        self.state.lock().hang_up = true;
        self.data_ready.notify_one();
    }
}

#[async_trait]
impl AsyncSerialPortAdapter for MockSerialPort {
    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        loop {
            {
                let mut state = self.state.lock();

                if state.fail_next_read {
                    state.fail_next_read = false;
                    return Err(PortError::io("simulated read fault"));
                }
                if state.hang_up {
                    state.hang_up = false;
                    return Ok(0);
                }
                if !state.read_queue.is_empty() {
                    let n = buffer.len().min(state.read_queue.len());
                    for (slot, byte) in buffer.iter_mut().zip(state.read_queue.drain(..n)) {
                        *slot = byte;
                    }
                    return Ok(n);
                }
            }

            // Idle line: wait for a test to enqueue data or inject a fault.
            self.data_ready.notified().await;
        }
    }

    async fn write_all_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(PortError::io("simulated write fault"));
        }

        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl ModemControl for MockSerialPort {
    fn read_modem_bits(&mut self) -> Result<ModemSignals, PortError> {
        let mut state = self.state.lock();

        if state.fail_next_modem_read {
            state.fail_next_modem_read = false;
            return Err(PortError::io("simulated TIOCMGET fault"));
        }

        state.modem_reads += 1;
        Ok(state
            .scripted_readings
            .pop_front()
            .unwrap_or(state.lines))
    }

    fn set_modem_bits(&mut self, signals: ModemSignals, raised: bool) -> Result<(), PortError> {
        let mut state = self.state.lock();

        if state.fail_next_modem_set {
            state.fail_next_modem_set = false;
            return Err(PortError::io("simulated TIOCMBIS fault"));
        }

        state.signal_log.push((signals, raised));
        if raised {
            state.lines.insert(signals);
        } else {
            state.lines.remove(signals);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
