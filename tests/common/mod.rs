//! Shared test utilities for serial-echo integration tests.
//!
//! - Engine construction over a mock port with a capturing sink
//! - Driving the engine a fixed number of cycles

#![allow(dead_code)]

use serial_echo::config::{DebugLevel, PortConfig};
use serial_echo::diagnostic::MemorySink;
use serial_echo::engine::{EngineState, TransferEngine};
use serial_echo::modem::FlowStrategy;
use serial_echo::port::MockSerialPort;
use std::sync::Arc;

/// An engine over a mock port, plus handles to inspect both sides.
pub struct Harness {
    pub port: MockSerialPort,
    pub sink: MemorySink,
    pub engine: TransferEngine<MockSerialPort>,
}

impl Harness {
    /// A started, verbose engine with the given frame size.
    pub fn new(frame_size: usize) -> Self {
        Self::with_strategy(frame_size, FlowStrategy::MirrorCts)
    }

    pub fn with_strategy(frame_size: usize, strategy: FlowStrategy) -> Self {
        let port = MockSerialPort::new("MOCK0");
        let sink = MemorySink::new();
        let config = PortConfig::new("MOCK0", 9600)
            .and_then(|c| c.with_frame_size(frame_size))
            .expect("valid test configuration")
            .with_debug_level(DebugLevel::Verbose)
            .with_flow_strategy(strategy);

        let mut engine = TransferEngine::new(port.clone(), config, Arc::new(sink.clone()));
        engine.start();

        Self { port, sink, engine }
    }

    /// Run one read step and one write step, asserting both succeed.
    pub async fn cycle(&mut self) {
        let after_read = self.engine.step().await.expect("read step");
        assert!(matches!(after_read, EngineState::Writing { .. }));

        let after_write = self.engine.step().await.expect("write step");
        assert_eq!(after_write, EngineState::Reading);
    }

    /// Everything echoed so far, concatenated.
    pub fn echoed(&self) -> Vec<u8> {
        self.port.get_write_log().concat()
    }
}
