//! Serial Echo Library
//!
//! An asynchronous serial-port echo service: read up to one frame from the
//! line, write exactly those bytes back, repeat. Between transfers RTS is
//! brought in line with CTS so the service can sit on a hardware-handshake
//! link as a passive relay.
//!
//! # Modules
//!
//! - `config`: TOML/env configuration and the validated `PortConfig`
//! - `port`: Port abstraction, tokio-serial implementation, and mock
//! - `modem`: Control-line bitmask and the RTS/CTS controller
//! - `engine`: The read/write state machine
//! - `diagnostic`: Trace formatting and the injected output sink
//! - `logging`: tracing-subscriber installation
//! - `error`: Unified error handling

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod logging;
pub mod modem;
pub mod port;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult, DebugLevel, PortConfig};
pub use diagnostic::{DiagnosticSink, Direction, MemorySink, TracingSink};
pub use engine::{EngineState, TransferEngine};
pub use error::{EchoError, EchoResult};
pub use modem::{FlowStrategy, ModemController, ModemSignals, ModemState};
pub use port::{
    AsyncSerialPortAdapter, EchoPort, MockSerialPort, ModemControl, PortError, TokioSerialPort,
};
