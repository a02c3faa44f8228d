//! MIPS assembler and simulator library.
//!
//! This crate assembles MIPS32 source and executes it on a simulated CPU with the
//! following:
//! 1. **Assembler:** A `pest` front end, operand and program extraction, and linking into
//!    an addressed `Program`, reporting every problem in one pass.
//! 2. **Core:** Register file, region-partitioned memory, ALU, and single-cycle or
//!    three-slot pipelined execution with RAW/WAW/CONTROL hazard reporting.
//! 3. **Bus:** A publish/subscribe message bus with a bounded worker pool, caller-runs
//!    overflow and a bounded wait for critical listeners.
//! 4. **Simulation:** Threaded run controller, console I/O, loading, configuration and
//!    statistics.

/// Assembler (syntax tree, parser, extraction, linking, problems).
pub mod asm;
/// Message bus (messages, listeners, worker pool).
pub mod bus;
/// Common types and constants (addresses, words, registers, runtime exceptions).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (registers, memory, pipeline, ALU, execution, syscalls).
pub mod core;
/// Instruction set (opcodes, operand formats, programs, decode, disassembly).
pub mod isa;
/// I/O collaborator, loader and threaded run controller.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, memory, pipeline and stats.
pub use crate::core::{Cpu, ExitStatus};
/// Publish/subscribe hub between the engine and its observers.
pub use crate::bus::MessageBus;
/// Threaded run controller.
pub use crate::sim::Simulator;
