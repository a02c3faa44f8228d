//! Running programs.
//!
//! Provides the I/O collaborator used by syscalls, file loading, and the threaded
//! controller that drives a CPU from start to finish.

/// Terminal-like I/O collaborator.
pub mod io;

/// Source and configuration loading.
pub mod loader;

/// Threaded run controller.
pub mod simulator;

pub use self::io::{ConsoleIo, Io, ReadError, Stream};
pub use self::simulator::{RunReport, RunState, Simulator};
