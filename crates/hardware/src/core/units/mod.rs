//! Execution units.
//!
//! The integer ALU, including the multiply/divide unit that writes `hi`/`lo`.

/// Arithmetic Logic Unit.
pub mod alu;
