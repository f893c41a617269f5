//! Port abstraction layer for serial communication.
//!
//! Provides the traits the transfer engine is written against, the tokio-serial
//! implementation, and a mock for driving the engine without hardware.

pub mod async_port;
pub mod error;
pub mod mock;
pub mod traits;

pub use async_port::TokioSerialPort;
pub use error::PortError;
pub use mock::MockSerialPort;
pub use traits::*;
