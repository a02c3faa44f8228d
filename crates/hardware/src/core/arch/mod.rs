//! MIPS architectural state components.
//!
//! This module contains the architectural register storage used by the register file.
//! 1. **GPRs:** General-Purpose Register file implementation.

/// General-Purpose Register file implementation.
pub mod gpr;
