//! I/O collaborator.
//!
//! The engine never touches files or terminals directly; syscalls go through the `Io`
//! trait. Reads may block the simulation thread and are unblocked by `cancel_read`.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::common::constants::POLL_INTERVAL_MS;

/// Output/input stream selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Stream {
    /// Program output and input.
    Standard,
    /// Errors and runtime problems.
    Error,
    /// Diagnostics, shown only when enabled.
    Debug,
}

/// Failure of a blocking read.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReadError {
    /// `cancel_read` was called while (or before) the read was waiting.
    #[error("read cancelled")]
    Cancelled,
    /// The input could not be interpreted as the requested type.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The input stream ended.
    #[error("input closed")]
    Closed,
}

/// Terminal-like collaborator used by syscalls.
pub trait Io: Send + Sync {
    /// Writes text.
    fn print_string(&self, stream: Stream, text: &str);

    /// Writes a signed integer in decimal.
    fn print_int(&self, stream: Stream, value: i32) {
        self.print_string(stream, &value.to_string());
    }

    /// Writes one character.
    fn print_char(&self, stream: Stream, ch: char) {
        self.print_string(stream, ch.encode_utf8(&mut [0; 4]));
    }

    /// Reads one line (without its terminator), truncated to `max_len` bytes.
    ///
    /// # Errors
    ///
    /// `Cancelled` after `cancel_read`, `Closed` at end of input.
    fn read_string(&self, stream: Stream, max_len: usize) -> Result<String, ReadError>;

    /// Reads one line and parses it as a decimal integer.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the line is not an integer, plus the `read_string` errors.
    fn read_int(&self, stream: Stream) -> Result<i32, ReadError> {
        let line = self.read_string(stream, usize::MAX)?;
        line.trim()
            .parse()
            .map_err(|_| ReadError::InvalidInput(line.trim().to_string()))
    }

    /// Reads a single character.
    ///
    /// # Errors
    ///
    /// `Cancelled` after `cancel_read`, `Closed` at end of input.
    fn read_char(&self, stream: Stream) -> Result<char, ReadError>;

    /// Unblocks any waiting read; it returns `ReadError::Cancelled`.
    fn cancel_read(&self);

    /// Re-arms reads after `cancel_read`. Collaborators without a sticky cancel ignore it.
    fn reset_cancel(&self) {}
}

/// `Io` over the process's stdin, stdout and stderr.
///
/// Stdin is read byte by byte on a background thread started on the first read, so
/// blocked reads can poll the cancel flag. The flag stays set until `reset_cancel`.
/// Program reads and an interactive front end share this one input channel.
#[derive(Debug)]
pub struct ConsoleIo {
    show_debug: bool,
    cancelled: AtomicBool,
    input: OnceLock<Mutex<Receiver<u8>>>,
}

impl ConsoleIo {
    /// Creates a console; the debug stream is printed only if `show_debug` is set.
    pub const fn new(show_debug: bool) -> Self {
        Self {
            show_debug,
            cancelled: AtomicBool::new(false),
            input: OnceLock::new(),
        }
    }

    fn receiver(&self) -> &Mutex<Receiver<u8>> {
        self.input.get_or_init(|| {
            let (tx, rx) = channel();
            let _ = thread::Builder::new()
                .name("stdin-reader".to_string())
                .spawn(move || {
                    let mut buffer = [0u8; 1];
                    let stdin = io::stdin();
                    let mut handle = stdin.lock();
                    while handle.read_exact(&mut buffer).is_ok() {
                        if tx.send(buffer[0]).is_err() {
                            break;
                        }
                    }
                });
            Mutex::new(rx)
        })
    }

    fn next_byte(&self) -> Result<u8, ReadError> {
        let rx = self
            .receiver()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(ReadError::Cancelled);
            }
            match rx.recv_timeout(Duration::from_millis(POLL_INTERVAL_MS)) {
                Ok(byte) => return Ok(byte),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(ReadError::Closed),
            }
        }
    }
}

impl Io for ConsoleIo {
    fn print_string(&self, stream: Stream, text: &str) {
        let _ = match stream {
            Stream::Standard => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|()| out.flush())
            }
            Stream::Error => io::stderr().lock().write_all(text.as_bytes()),
            Stream::Debug if self.show_debug => io::stderr().lock().write_all(text.as_bytes()),
            Stream::Debug => Ok(()),
        };
    }

    fn read_string(&self, _stream: Stream, max_len: usize) -> Result<String, ReadError> {
        let mut bytes = Vec::new();
        loop {
            match self.next_byte() {
                Ok(b'\n') => break,
                Ok(byte) => bytes.push(byte),
                Err(ReadError::Closed) if !bytes.is_empty() => break,
                Err(err) => return Err(err),
            }
        }
        if bytes.last() == Some(&b'\r') {
            let _ = bytes.pop();
        }
        bytes.truncate(max_len);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_char(&self, _stream: Stream) -> Result<char, ReadError> {
        self.next_byte().map(char::from)
    }

    fn cancel_read(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
