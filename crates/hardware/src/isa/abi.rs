//! MIPS Application Binary Interface (ABI) register names.
//!
//! Defines the conventional register names and the lookup table used to resolve
//! `$name` / `$number` register references. The table is plain immutable data owned by
//! whoever needs it (assembler or engine) rather than a process-wide singleton.

use std::collections::HashMap;

use crate::common::constants::GPR_COUNT;
use crate::common::reg::Register;

/// Conventional ABI names of the 32 general-purpose registers, by index.
pub const REGISTER_NAMES: [&str; GPR_COUNT] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp", "fp",
    "ra",
];

/// Syscall number register.
pub const REG_SYSCALL: Register = Register::V0;
/// Syscall result register.
pub const REG_RESULT: Register = Register::V0;
/// First syscall argument.
pub const REG_ARG0: Register = Register::A0;
/// Second syscall argument.
pub const REG_ARG1: Register = Register::A1;
/// Link register written by `jal`/`jalr`.
pub const REG_LINK: Register = Register::RA;

/// Name ↔ id lookup for register references.
#[derive(Clone, Debug)]
pub struct RegisterTable {
    by_name: HashMap<String, Register>,
}

impl Default for RegisterTable {
    fn default() -> Self {
        Self::mips()
    }
}

impl RegisterTable {
    /// Builds the standard MIPS table (ABI names plus `s8` as an alias of `fp`).
    pub fn mips() -> Self {
        let mut by_name = HashMap::with_capacity(GPR_COUNT + 1);
        for (id, name) in REGISTER_NAMES.iter().enumerate() {
            if let Some(reg) = Register::new(id as u8) {
                let _ = by_name.insert((*name).to_string(), reg);
            }
        }
        let _ = by_name.insert("s8".to_string(), Register::FP);
        Self { by_name }
    }

    /// Resolves a register reference by symbolic name or numeric id.
    ///
    /// Accepts the reference with or without the leading `$`.
    ///
    /// # Returns
    ///
    /// `None` if the name is unknown or the number is outside `0..32`.
    pub fn resolve(&self, text: &str) -> Option<Register> {
        let name = text.strip_prefix('$').unwrap_or(text);
        if name.is_empty() {
            return None;
        }
        if name.bytes().all(|b| b.is_ascii_digit()) {
            return name.parse::<u8>().ok().and_then(Register::new);
        }
        self.by_name.get(name).copied()
    }
}

/// Returns the ABI name of a register.
pub const fn register_name(reg: Register) -> &'static str {
    REGISTER_NAMES[reg.index()]
}
