//! Bus observers shipped with the command-line front end.

use std::io::{self, Write};
use std::sync::Mutex;

use mipsim_core::bus::Listener;
use mipsim_core::bus::Message;
use mipsim_core::bus::message::{AnnotationMessage, ProblemMessage};

/// Prints runtime problems and annotations to stderr.
#[derive(Debug, Default)]
pub struct ConsoleListener;

impl Listener for ConsoleListener {
    fn on_problem(&self, message: &ProblemMessage) {
        let mut err = io::stderr().lock();
        let _ = match (message.line, message.address) {
            (Some(line), Some(address)) => {
                writeln!(err, "  at line {line} (address {address})")
            }
            (None, Some(address)) => writeln!(err, "  at address {address}"),
            _ => Ok(()),
        };
    }

    fn on_annotation(&self, message: &AnnotationMessage) {
        let _ = match message.address {
            Some(address) => writeln!(io::stderr(), "note [{address}]: {}", message.text),
            None => writeln!(io::stderr(), "note: {}", message.text),
        };
    }
}

/// Writes every message as one JSON object per line.
///
/// Marked critical so the simulation waits (bounded) for each line to be written
/// before the next cycle.
pub struct JsonTraceListener<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonTraceListener<W> {
    /// Creates a trace writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W> std::fmt::Debug for JsonTraceListener<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonTraceListener").finish_non_exhaustive()
    }
}

impl<W: Write + Send> Listener for JsonTraceListener<W> {
    fn is_critical(&self, _message: &Message) -> bool {
        true
    }

    fn handle(&self, message: &Message) {
        let Ok(line) = serde_json::to_string(message) else {
            return;
        };
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let _ = writeln!(out, "{line}");
    }
}
