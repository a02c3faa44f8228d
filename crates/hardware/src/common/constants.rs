//! Global Simulator Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Segment Constants:** Conventional base addresses of the text and data segments.
//! 2. **Instruction Constants:** Instruction width and register counts.
//! 3. **Memory Layout Constants:** Heap, stack and global pointer defaults.
//! 4. **Simulation Constants:** Stop-latency and polling intervals.

/// Base address of the text (instruction) segment.
pub const TEXT_BASE: u32 = 0x0040_0000;

/// Base address of the static data segment.
pub const DATA_BASE: u32 = 0x1000_0000;

/// Base address of the heap; grows upward from here via `sbrk`.
pub const HEAP_BASE: u32 = 0x1004_0000;

/// Initial global pointer value (`$gp`).
pub const GLOBAL_POINTER: u32 = 0x1000_8000;

/// Highest word-aligned stack address; the stack grows downward from here.
pub const STACK_TOP: u32 = 0x7FFF_FFFC;

/// Initial stack pointer value (`$sp`).
pub const STACK_POINTER: u32 = 0x7FFF_EFFC;

/// Default heap capacity in bytes (1 MiB).
pub const HEAP_SIZE: u32 = 1024 * 1024;

/// Default stack capacity in bytes (1 MiB).
pub const STACK_SIZE: u32 = 1024 * 1024;

/// Bytes below the stack limit that are still reported as stack overflow
/// rather than a plain out-of-range access.
pub const STACK_GUARD_BYTES: u32 = 64 * 1024;

/// Size of every instruction in the text segment in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// Maximum number of bytes copied by a single string print before giving up
/// on finding the NUL terminator.
pub const MAX_STRING_LENGTH: u32 = 64 * 1024;

/// Polling interval used by blocking reads and paused simulations.
pub const POLL_INTERVAL_MS: u64 = 5;
