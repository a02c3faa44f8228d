//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Alignment Validation:** Word and half-word accesses must be naturally aligned.
//! 2. **Fault Generation:** Memory exceptions name the direction of the failed access.
//! 3. **Observability:** Data-movement messages report the access width.

use serde::Serialize;

/// Direction of a data memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessType {
    /// Data read access (loads, syscall buffers).
    Read,
    /// Data write access (stores, syscall buffers).
    Write,
}

/// Width of a data memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessWidth {
    /// One byte.
    Byte,
    /// Two bytes, 2-byte aligned.
    Half,
    /// Four bytes, 4-byte aligned.
    Word,
}

impl AccessWidth {
    /// Number of bytes moved by an access of this width.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }
}
