//! The echo cycle.
//!
//! A [`TransferEngine`] owns one open port and one frame buffer and drives
//! them through an explicit state machine:
//!
//! ```text
//!           open            read ok             write ok
//!   Idle ─────────> Reading ────────> Writing ─────────> Reading ...
//!                      │                 │
//!                      └──── error ──────┴──────> Failed (terminal)
//! ```
//!
//! Before every read and every write the modem controller gets a chance to
//! bring RTS in line with CTS. Only one operation is ever in flight: the next
//! one is issued after the previous completion has been handled, so the
//! buffer is never shared.

use crate::config::PortConfig;
use crate::diagnostic::{transfer_line, DiagnosticSink, Direction};
use crate::error::{EchoError, EchoResult};
use crate::modem::{ModemController, ModemState};
use crate::port::{EchoPort, PortError, TokioSerialPort};
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the engine is in the read/write alternation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no operation issued yet.
    Idle,
    /// Next step reads up to one frame.
    Reading,
    /// Next step writes back the `len` bytes just read.
    Writing { len: usize },
    /// A step failed; the engine performs no further I/O.
    Failed,
}

/// Owns the port handle and the frame buffer and runs the echo cycle.
pub struct TransferEngine<P: EchoPort> {
    port: P,
    config: PortConfig,
    buffer: Box<[u8]>,
    state: EngineState,
    modem: ModemController,
    sink: Arc<dyn DiagnosticSink>,
}

impl TransferEngine<TokioSerialPort> {
    /// Open and configure the device named in `config`, ready to read.
    pub fn open(config: PortConfig, sink: Arc<dyn DiagnosticSink>) -> EchoResult<Self> {
        let port = TokioSerialPort::open(&config)
            .map_err(|e| EchoError::from_open(config.path(), e))?;
        info!(port = config.path(), baud_rate = config.baud_rate(), "Serial port configured");

        let mut engine = Self::new(port, config, sink);
        engine.start();
        Ok(engine)
    }
}

impl<P: EchoPort> TransferEngine<P> {
    /// Wrap an already open port. The engine starts `Idle`.
    pub fn new(port: P, config: PortConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let modem = ModemController::new(
            config.flow_strategy(),
            config.debug_level(),
            Arc::clone(&sink),
        );
        let engine = Self {
            buffer: vec![0u8; config.frame_size()].into_boxed_slice(),
            port,
            config,
            state: EngineState::Idle,
            modem,
            sink,
        };
        engine.verbose("Transfer engine created");
        engine
    }

    /// Leave `Idle` and arm the first read. No-op in any other state.
    pub fn start(&mut self) {
        if self.state == EngineState::Idle {
            self.state = EngineState::Reading;
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn modem_state(&self) -> ModemState {
        self.modem.state()
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Perform the operation the current state calls for and handle its
    /// completion. Returns the state reached.
    ///
    /// A failed engine stays failed and issues nothing.
    pub async fn step(&mut self) -> EchoResult<EngineState> {
        match self.state {
            EngineState::Idle => {
                self.start();
                Ok(self.state)
            }
            EngineState::Reading => self.start_read().await,
            EngineState::Writing { len } => self.start_write(len).await,
            EngineState::Failed => Ok(EngineState::Failed),
        }
    }

    /// Run the cycle until a step fails, and return that failure.
    ///
    /// Returns `Ok(())` only when called on an engine that had already failed.
    pub async fn run(&mut self) -> EchoResult<()> {
        loop {
            if self.step().await? == EngineState::Failed {
                return Ok(());
            }
        }
    }

    async fn start_read(&mut self) -> EchoResult<EngineState> {
        if let Err(e) = self.modem.manage_flow_control(&mut self.port) {
            return Err(self.fail(e));
        }

        debug!(port = self.port.name(), capacity = self.buffer.len(), "Issuing read");
        let completion = self.port.read_bytes(&mut self.buffer).await;
        self.on_read_complete(completion)
    }

    async fn start_write(&mut self, len: usize) -> EchoResult<EngineState> {
        if let Err(e) = self.modem.manage_flow_control(&mut self.port) {
            return Err(self.fail(e));
        }

        debug!(port = self.port.name(), len, "Issuing write");
        let completion = self.port.write_all_bytes(&self.buffer[..len]).await;
        self.on_write_complete(completion)
    }

    /// Handle the outcome of a read: trace it and arm the echo write.
    pub fn on_read_complete(
        &mut self,
        completion: Result<usize, PortError>,
    ) -> EchoResult<EngineState> {
        if self.state != EngineState::Reading {
            warn!(state = ?self.state, "Ignoring read completion outside of Reading");
            return Ok(self.state);
        }

        let len = match completion {
            Ok(0) => {
                let source = PortError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "device hung up",
                ));
                return Err(self.fail(EchoError::TransferFailed {
                    direction: Direction::Read,
                    source,
                }));
            }
            // A port never hands back more than it was given room for.
            Ok(n) => n.min(self.buffer.len()),
            Err(source) => {
                return Err(self.fail(EchoError::TransferFailed {
                    direction: Direction::Read,
                    source,
                }))
            }
        };

        self.trace(Direction::Read, len);
        self.state = EngineState::Writing { len };
        Ok(self.state)
    }

    /// Handle the outcome of a write: trace it and arm the next read.
    pub fn on_write_complete(
        &mut self,
        completion: Result<usize, PortError>,
    ) -> EchoResult<EngineState> {
        if !matches!(self.state, EngineState::Writing { .. }) {
            warn!(state = ?self.state, "Ignoring write completion outside of Writing");
            return Ok(self.state);
        }

        match completion {
            Ok(n) => {
                self.trace(Direction::Write, n.min(self.buffer.len()));
                self.state = EngineState::Reading;
                Ok(self.state)
            }
            Err(source) => Err(self.fail(EchoError::TransferFailed {
                direction: Direction::Write,
                source,
            })),
        }
    }

    fn trace(&self, direction: Direction, len: usize) {
        if self.config.debug_level().is_verbose() {
            self.sink.line(&transfer_line(direction, &self.buffer[..len]));
        }
    }

    fn verbose(&self, text: &str) {
        if self.config.debug_level().is_verbose() {
            self.sink.line(text);
        }
    }

    fn fail(&mut self, err: EchoError) -> EchoError {
        debug!(port = self.port.name(), error = %err, "Transfer engine failed");
        self.state = EngineState::Failed;
        err
    }
}

impl<P: EchoPort> Drop for TransferEngine<P> {
    fn drop(&mut self) {
        self.verbose("Transfer engine destroyed");
    }
}

impl<P: EchoPort> std::fmt::Debug for TransferEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine")
            .field("port", &self.port.name())
            .field("state", &self.state)
            .field("frame_size", &self.buffer.len())
            .field("modem", &self.modem)
            .finish()
    }
}
