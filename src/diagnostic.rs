//! Diagnostic formatting and the injected output sink.
//!
//! Trace lines are advisory: they describe what crossed the wire and never
//! influence the echo cycle. Where they end up is decided by whoever builds
//! the engine, through a [`DiagnosticSink`].

use parking_lot::Mutex;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Destination for advisory diagnostic lines and fatal error reports.
pub trait DiagnosticSink: Send + Sync {
    /// Emit one advisory line.
    fn line(&self, text: &str);

    /// Emit one error report line.
    fn error(&self, text: &str);
}

/// Production sink that forwards every line to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn line(&self, text: &str) {
        tracing::info!(target: "serial_echo::diag", "{text}");
    }

    fn error(&self, text: &str) {
        tracing::error!(target: "serial_echo::diag", "{text}");
    }
}

/// Sink that keeps every line in memory.
///
/// Clones share the same buffers, so a test can hand one clone to the engine
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advisory lines emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Error reports emitted so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
        self.errors.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn line(&self, text: &str) {
        self.lines.lock().push(text.to_string());
    }

    fn error(&self, text: &str) {
        self.errors.lock().push(text.to_string());
    }
}

/// Direction of a completed transfer, used as the trace label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("Read"),
            Self::Write => f.write_str("Write"),
        }
    }
}

/// Render bytes so that every one of them is visible on a single line.
///
/// Printable ASCII passes through; common control codes become `[\n]`-style
/// tokens and anything else becomes `[<HEX>]` without zero padding.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        match byte {
            0x20..=0x7e => out.push(byte as char),
            0x00 => out.push_str("[\\0]"),
            b'\n' => out.push_str("[\\n]"),
            b'\r' => out.push_str("[\\r]"),
            b'\t' => out.push_str("[\\t]"),
            0x0b => out.push_str("[\\v]"),
            0x08 => out.push_str("[\\b]"),
            0x0c => out.push_str("[\\f]"),
            0x07 => out.push_str("[\\a]"),
            other => {
                let _ = write!(out, "[{other:X}]");
            }
        }
    }
    out
}

/// The trace line for one completed transfer.
pub fn transfer_line(direction: Direction, bytes: &[u8]) -> String {
    format!(
        "{direction} message: {} | Message length: {}",
        escape_bytes(bytes),
        bytes.len()
    )
}
