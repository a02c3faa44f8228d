use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use mipsim_core::sim::io::{Io, ReadError, Stream};
use mockall::mock;

mock! {
    pub Io {}
    impl Io for Io {
        fn print_string(&self, stream: Stream, text: &str);
        fn read_string(&self, stream: Stream, max_len: usize) -> Result<String, ReadError>;
        fn read_char(&self, stream: Stream) -> Result<char, ReadError>;
        fn cancel_read(&self);
    }
}

/// An I/O collaborator fed from a fixed list of input lines that captures all output.
///
/// Reads past the end of the script report `Closed`, or `Cancelled` once
/// `cancel_read` was called.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    input: Mutex<VecDeque<String>>,
    standard: Mutex<String>,
    error: Mutex<String>,
    debug: Mutex<String>,
    cancelled: AtomicBool,
}

impl ScriptedIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(lines: &[&str]) -> Self {
        let io = Self::new();
        io.input
            .lock()
            .unwrap()
            .extend(lines.iter().map(|l| (*l).to_string()));
        io
    }

    pub fn stdout(&self) -> String {
        self.standard.lock().unwrap().clone()
    }

    pub fn stderr(&self) -> String {
        self.error.lock().unwrap().clone()
    }

    pub fn debug_output(&self) -> String {
        self.debug.lock().unwrap().clone()
    }

    fn next_line(&self) -> Result<String, ReadError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ReadError::Cancelled);
        }
        self.input.lock().unwrap().pop_front().ok_or(ReadError::Closed)
    }
}

impl Io for ScriptedIo {
    fn print_string(&self, stream: Stream, text: &str) {
        let sink = match stream {
            Stream::Standard => &self.standard,
            Stream::Error => &self.error,
            Stream::Debug => &self.debug,
        };
        sink.lock().unwrap().push_str(text);
    }

    fn read_string(&self, _stream: Stream, max_len: usize) -> Result<String, ReadError> {
        let mut line = self.next_line()?;
        line.truncate(max_len);
        Ok(line)
    }

    fn read_char(&self, _stream: Stream) -> Result<char, ReadError> {
        let line = self.next_line()?;
        line.chars().next().ok_or(ReadError::Closed)
    }

    fn cancel_read(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// An I/O collaborator whose reads block until `cancel_read`.
#[derive(Debug, Default)]
pub struct BlockingIo {
    waiting: AtomicBool,
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl BlockingIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a read is currently blocked.
    pub fn is_waiting(&self) -> bool {
        self.waiting.load(Ordering::SeqCst)
    }

    fn block(&self) -> ReadError {
        self.waiting.store(true, Ordering::SeqCst);
        let guard = self.cancelled.lock().unwrap();
        let _guard = self.wake.wait_while(guard, |cancelled| !*cancelled).unwrap();
        self.waiting.store(false, Ordering::SeqCst);
        ReadError::Cancelled
    }
}

impl Io for BlockingIo {
    fn print_string(&self, _stream: Stream, _text: &str) {}

    fn read_string(&self, _stream: Stream, _max_len: usize) -> Result<String, ReadError> {
        Err(self.block())
    }

    fn read_char(&self, _stream: Stream) -> Result<char, ReadError> {
        Err(self.block())
    }

    fn cancel_read(&self) {
        *self.cancelled.lock().unwrap() = true;
        self.wake.notify_all();
    }
}
