//! Common utilities and types used throughout the MIPS simulator.
//!
//! This module provides fundamental building blocks that are shared across the
//! assembler and the execution engine. It includes:
//! 1. **Address Types:** A strong type for 32-bit simulated addresses.
//! 2. **Words:** Two's-complement 32-bit values with checked and wrapping arithmetic.
//! 3. **Constants:** Segment bases, instruction size and memory layout defaults.
//! 4. **Memory Access:** Access widths and directions for load/store checks.
//! 5. **Error Handling:** Runtime exceptions raised by the engine.
//! 6. **Register Management:** Register identifiers and the architectural register file.

/// Simulated address type.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Runtime exception definitions.
pub mod error;

/// Register identifiers and register file.
pub mod reg;

/// 32-bit two's-complement word.
pub mod word;

pub use addr::Address;
pub use data::{AccessType, AccessWidth};
pub use error::SimError;
pub use reg::{RegRef, Register, RegisterFile};
pub use word::Word;
