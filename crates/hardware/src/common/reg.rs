//! Register identifiers and the architectural register file.
//!
//! This module provides the `Register` identifier and the `RegisterFile` struct, which
//! holds every piece of architectural register state. It provides:
//! 1. **Identifiers:** A validated 0-31 register id with the conventional MIPS aliases.
//! 2. **Unified Storage:** General-purpose registers plus `pc`, `hi` and `lo`.
//! 3. **Snapshots:** The register file is `Clone` so observers receive point-in-time copies.

use std::fmt;

use serde::Serialize;

use super::addr::Address;
use super::constants::GPR_COUNT;
use super::word::Word;
use crate::core::arch::gpr::Gpr;

/// A general-purpose register id in `0..32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Register(u8);

impl Register {
    /// `$zero`, hardwired to zero.
    pub const ZERO: Self = Self(0);
    /// `$at`, assembler temporary.
    pub const AT: Self = Self(1);
    /// `$v0`, syscall number and first return value.
    pub const V0: Self = Self(2);
    /// `$v1`, second return value.
    pub const V1: Self = Self(3);
    /// `$a0`, first argument.
    pub const A0: Self = Self(4);
    /// `$a1`, second argument.
    pub const A1: Self = Self(5);
    /// `$a2`, third argument.
    pub const A2: Self = Self(6);
    /// `$a3`, fourth argument.
    pub const A3: Self = Self(7);
    /// `$t0`, first temporary.
    pub const T0: Self = Self(8);
    /// `$t1`.
    pub const T1: Self = Self(9);
    /// `$t2`.
    pub const T2: Self = Self(10);
    /// `$t3`.
    pub const T3: Self = Self(11);
    /// `$t4`.
    pub const T4: Self = Self(12);
    /// `$t5`.
    pub const T5: Self = Self(13);
    /// `$t6`.
    pub const T6: Self = Self(14);
    /// `$t7`.
    pub const T7: Self = Self(15);
    /// `$s0`, first saved register.
    pub const S0: Self = Self(16);
    /// `$s1`.
    pub const S1: Self = Self(17);
    /// `$s2`.
    pub const S2: Self = Self(18);
    /// `$s3`.
    pub const S3: Self = Self(19);
    /// `$s4`.
    pub const S4: Self = Self(20);
    /// `$s5`.
    pub const S5: Self = Self(21);
    /// `$s6`.
    pub const S6: Self = Self(22);
    /// `$s7`.
    pub const S7: Self = Self(23);
    /// `$t8`.
    pub const T8: Self = Self(24);
    /// `$t9`.
    pub const T9: Self = Self(25);
    /// `$k0`, reserved for the kernel.
    pub const K0: Self = Self(26);
    /// `$k1`, reserved for the kernel.
    pub const K1: Self = Self(27);
    /// `$gp`, global pointer.
    pub const GP: Self = Self(28);
    /// `$sp`, stack pointer.
    pub const SP: Self = Self(29);
    /// `$fp`, frame pointer.
    pub const FP: Self = Self(30);
    /// `$ra`, return address.
    pub const RA: Self = Self(31);

    /// Creates a register id, returning `None` outside `0..32`.
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < GPR_COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Returns the numeric id.
    #[inline(always)]
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Returns the id as an index into the register array.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for `$zero`.
    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// An architectural register: a GPR or one of the multiply/divide registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RegRef {
    /// A general-purpose register.
    Gpr(Register),
    /// The `hi` register.
    Hi,
    /// The `lo` register.
    Lo,
}

impl fmt::Display for RegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpr(reg) => write!(f, "{reg}"),
            Self::Hi => f.write_str("hi"),
            Self::Lo => f.write_str("lo"),
        }
    }
}

/// Architectural register state: 32 GPRs, program counter, `hi` and `lo`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    gpr: Gpr,
    /// Program counter.
    pub pc: Address,
    /// High half of multiply results / division remainder.
    pub hi: Word,
    /// Low half of multiply results / division quotient.
    pub lo: Word,
}

impl RegisterFile {
    /// Creates a register file with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a general-purpose register. `$zero` always reads 0.
    pub fn read(&self, reg: Register) -> Word {
        self.gpr.read(reg.index())
    }

    /// Writes a general-purpose register. Writes to `$zero` are ignored.
    ///
    /// # Returns
    ///
    /// The previous value of the register.
    pub fn write(&mut self, reg: Register, val: Word) -> Word {
        let old = self.gpr.read(reg.index());
        self.gpr.write(reg.index(), val);
        old
    }

    /// Copies out all general-purpose registers.
    pub fn gprs(&self) -> [Word; GPR_COUNT] {
        self.gpr.values()
    }

    /// Dumps all registers to stdout in pairs.
    pub fn dump(&self) {
        self.gpr.dump();
        println!("pc ={} hi ={:#010x} lo ={:#010x}", self.pc, self.hi, self.lo);
    }
}
