//! MIPS General-Purpose Register File.
//!
//! This module implements the General-Purpose Register (GPR) file for the MIPS architecture.
//! It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`$0`-`$31`).
//! 2. **Invariant Enforcement:** Ensures that register `$zero` is hardwired to zero.
//! 3. **Debugging:** Provides utilities for dumping the complete register state.

use crate::common::constants::GPR_COUNT;
use crate::common::word::Word;
use crate::isa::abi::REGISTER_NAMES;

/// General-Purpose Register file.
///
/// Contains 32 general-purpose registers used for integer operations. Register `$zero`
/// is hardwired to zero and cannot be modified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [Word; GPR_COUNT],
}

impl Gpr {
    /// Creates a new general-purpose register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The word stored in the specified register. Register `$zero` always returns 0.
    pub fn read(&self, idx: usize) -> Word {
        if idx == 0 { Word::ZERO } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The word to write.
    pub fn write(&mut self, idx: usize, val: Word) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Copies out every register value.
    pub fn values(&self) -> [Word; GPR_COUNT] {
        self.regs
    }

    /// Dumps the contents of all general-purpose registers to stdout.
    ///
    /// Displays registers in pairs with hexadecimal formatting for debugging purposes.
    pub fn dump(&self) {
        for i in (0..GPR_COUNT).step_by(2) {
            println!(
                "${:<5}={:#010x} ${:<5}={:#010x}",
                REGISTER_NAMES[i],
                self.regs[i],
                REGISTER_NAMES[i + 1],
                self.regs[i + 1]
            );
        }
    }
}
