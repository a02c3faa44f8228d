//! Core processor implementation.
//!
//! This module contains the CPU and the machine parts it is built from: architectural
//! register storage, region-partitioned data memory, the three-slot pipeline and the
//! ALU.

/// Architecture-specific components (register storage).
pub mod arch;

/// CPU core implementation and execution orchestration.
pub mod cpu;

/// Region-partitioned data memory.
pub mod memory;

/// Pipeline slots and hazard classification.
pub mod pipeline;

/// Execution units (ALU).
pub mod units;

pub use self::cpu::{Cpu, ExitStatus};
