//! RTS management between transfers.

use super::signals::ModemSignals;
use crate::config::DebugLevel;
use crate::diagnostic::DiagnosticSink;
use crate::error::{EchoError, EchoResult};
use crate::port::ModemControl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// How RTS is driven before each transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FlowStrategy {
    /// Mirror CTS onto RTS on every non-zero reading; skip zero readings.
    #[default]
    MirrorCts,
    /// Mirror CTS onto RTS on every reading, a zero reading clears RTS.
    MirrorCtsAlways,
    /// Only write RTS when CTS differs from the last non-zero reading.
    MirrorCtsOnChange,
    /// Never touch the control lines.
    Passive,
}

impl FlowStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MirrorCts => "mirror-cts",
            Self::MirrorCtsAlways => "mirror-cts-always",
            Self::MirrorCtsOnChange => "mirror-cts-on-change",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for FlowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mirror-cts" => Ok(Self::MirrorCts),
            "mirror-cts-always" => Ok(Self::MirrorCtsAlways),
            "mirror-cts-on-change" => Ok(Self::MirrorCtsOnChange),
            "passive" => Ok(Self::Passive),
            other => Err(format!("unknown flow control strategy '{other}'")),
        }
    }
}

/// Current and previous control-line snapshots.
///
/// `previous` only ever takes non-zero readings, so once a line state has
/// been seen it is never lost to a glitchy zero read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModemState {
    pub current: ModemSignals,
    pub previous: ModemSignals,
}

impl ModemState {
    /// Record a reading. Returns `true` when it carried signal information.
    pub fn observe(&mut self, reading: ModemSignals) -> bool {
        self.current = reading;
        if reading.is_empty() {
            return false;
        }
        self.previous = reading;
        true
    }
}

/// Reads and drives the modem control lines for the transfer engine.
///
/// The controller never owns the port; the engine lends it the line register
/// for the duration of each call.
pub struct ModemController {
    strategy: FlowStrategy,
    debug_level: DebugLevel,
    state: ModemState,
    sink: Arc<dyn DiagnosticSink>,
}

impl ModemController {
    pub fn new(strategy: FlowStrategy, debug_level: DebugLevel, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            strategy,
            debug_level,
            state: ModemState::default(),
            sink,
        }
    }

    pub fn state(&self) -> ModemState {
        self.state
    }

    /// Query the control-line register.
    pub fn read_signals(&self, lines: &mut dyn ModemControl) -> EchoResult<ModemSignals> {
        let reading = lines
            .read_modem_bits()
            .map_err(EchoError::SignalQueryFailed)?;

        if self.debug_level.is_verbose() {
            self.sink
                .line(&format!("ModemData: {:x}{}", reading, reading));
        }
        Ok(reading)
    }

    /// Assert or clear `signal`.
    pub fn set_signal(
        &self,
        lines: &mut dyn ModemControl,
        signal: ModemSignals,
        raised: bool,
    ) -> EchoResult<()> {
        lines
            .set_modem_bits(signal, raised)
            .map_err(|source| EchoError::SignalSetFailed {
                signal,
                raised,
                source,
            })?;

        if self.debug_level.is_verbose() {
            let verb = if raised { "set" } else { "cleared" };
            self.sink.line(&format!("{} {verb}!", signal.label()));
        }
        Ok(())
    }

    /// Bring RTS in line with CTS according to the configured strategy.
    pub fn manage_flow_control(&mut self, lines: &mut dyn ModemControl) -> EchoResult<()> {
        if self.strategy == FlowStrategy::Passive {
            return Ok(());
        }

        let last_cts = self.state.previous.contains(ModemSignals::CTS);
        let seen_before = !self.state.previous.is_empty();

        let reading = self.read_signals(lines)?;
        let informative = self.state.observe(reading);
        let cts = reading.contains(ModemSignals::CTS);

        let apply = match self.strategy {
            FlowStrategy::MirrorCts => informative,
            FlowStrategy::MirrorCtsAlways => true,
            FlowStrategy::MirrorCtsOnChange => informative && (!seen_before || cts != last_cts),
            FlowStrategy::Passive => false,
        };

        if !apply {
            debug!(reading = reading.bits(), strategy = %self.strategy, "RTS left untouched");
            if !informative && self.debug_level.is_verbose() {
                self.sink.line("Skipped RTS");
            }
            return Ok(());
        }

        self.set_signal(lines, ModemSignals::RTS, cts)
    }
}

impl fmt::Debug for ModemController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModemController")
            .field("strategy", &self.strategy)
            .field("debug_level", &self.debug_level)
            .field("state", &self.state)
            .finish()
    }
}
