//! Modem control lines and RTS/CTS pass-through.

mod controller;
mod signals;

pub use controller::{FlowStrategy, ModemController, ModemState};
pub use signals::ModemSignals;
