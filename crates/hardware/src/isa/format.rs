//! Operand-format contracts.
//!
//! Every opcode is bound to exactly one `OperandFormat` describing which operand types
//! are accepted at each of up to three positions. It provides:
//! 1. **Operand Types:** The closed set of types an operand can have or a slot can demand.
//! 2. **Acceptance Hierarchy:** Narrow widening rules (register roles, immediate classes).
//! 3. **Validation:** Count and per-position checks producing a precise mismatch.

use std::fmt;

use serde::Serialize;

use crate::isa::operand::Operand;

/// Operand type, either derived from an operand or demanded by a format slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OperandType {
    /// Any register reference (the type every register operand has).
    Register,
    /// Slot: destination register (`rd`).
    DestRegister,
    /// Slot: first source register (`rs`).
    SrcRegister,
    /// Slot: second source / target register (`rt`).
    TargetRegister,
    /// Signed 16-bit immediate.
    Immediate,
    /// Unsigned 16-bit immediate.
    UnsignedImmediate,
    /// Full 32-bit integer.
    Integer,
    /// String literal.
    String,
    /// Label reference without a base register.
    Label,
    /// Base-register and/or constant memory reference.
    BaseOffset,
    /// Slot: any memory reference (label or base-offset).
    Address,
}

impl OperandType {
    /// Returns `true` if an operand of type `actual` may fill a slot of type `self`.
    ///
    /// In permissive mode a full 32-bit integer is also accepted by immediate slots.
    pub const fn accepts(self, actual: Self, permissive: bool) -> bool {
        use OperandType::{
            Address, BaseOffset, DestRegister, Immediate, Integer, Label, Register,
            SrcRegister, TargetRegister, UnsignedImmediate,
        };
        if self as u8 == actual as u8 {
            return true;
        }
        match (self, actual) {
            (DestRegister | SrcRegister | TargetRegister, Register)
            | (Immediate, UnsignedImmediate)
            | (Integer, Immediate | UnsignedImmediate)
            | (Address, Label | BaseOffset) => true,
            (Immediate | UnsignedImmediate, Integer) => permissive,
            _ => false,
        }
    }

    /// Human readable name used in problem messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::DestRegister => "destination register",
            Self::SrcRegister => "source register",
            Self::TargetRegister => "target register",
            Self::Immediate => "16-bit signed immediate",
            Self::UnsignedImmediate => "16-bit unsigned immediate",
            Self::Integer => "32-bit integer",
            Self::String => "string",
            Self::Label => "label",
            Self::BaseOffset => "base-offset address",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an operand list does not satisfy a format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatMismatch {
    /// Wrong number of operands.
    Count {
        /// Operands the format requires.
        expected: usize,
        /// Operands supplied.
        found: usize,
    },
    /// An operand at `position` has a type the slot does not accept.
    Type {
        /// Zero-based operand position.
        position: usize,
        /// Types accepted at that position.
        expected: &'static [OperandType],
        /// Type of the supplied operand.
        found: OperandType,
    },
}

impl fmt::Display for FormatMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count { expected, found } => {
                write!(f, "expected {expected} operand(s), found {found}")
            }
            Self::Type {
                position,
                expected,
                found,
            } => {
                write!(f, "operand {} must be ", position + 1)?;
                for (i, ty) in expected.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ", found {found}")
            }
        }
    }
}

/// Per-position accepted operand types. An empty slot means "no operand here".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandFormat {
    slots: [&'static [OperandType]; 3],
}

use OperandType as T;

impl OperandFormat {
    /// No operands (`syscall`, `nop`, `break`).
    pub const NONE: Self = Self::new([&[], &[], &[]]);
    /// `rd, rs, rt`.
    pub const DEST_SRC_TARGET: Self =
        Self::new([&[T::DestRegister], &[T::SrcRegister], &[T::TargetRegister]]);
    /// `rd, rt, shamt`.
    pub const DEST_SRC_SHIFT: Self = Self::new([
        &[T::DestRegister],
        &[T::SrcRegister],
        &[T::UnsignedImmediate],
    ]);
    /// `rs, rt` (multiply/divide).
    pub const SRC_TARGET: Self = Self::new([&[T::SrcRegister], &[T::TargetRegister], &[]]);
    /// `rd, rs` (move).
    pub const DEST_SRC: Self = Self::new([&[T::DestRegister], &[T::SrcRegister], &[]]);
    /// `rd`.
    pub const DEST: Self = Self::new([&[T::DestRegister], &[], &[]]);
    /// `rs`.
    pub const SRC: Self = Self::new([&[T::SrcRegister], &[], &[]]);
    /// `rt, rs, simm16`.
    pub const TARGET_SRC_IMMEDIATE: Self = Self::new([
        &[T::TargetRegister],
        &[T::SrcRegister],
        &[T::Immediate],
    ]);
    /// `rt, rs, uimm16`.
    pub const TARGET_SRC_UNSIGNED: Self = Self::new([
        &[T::TargetRegister],
        &[T::SrcRegister],
        &[T::UnsignedImmediate],
    ]);
    /// `rt, uimm16` (lui).
    pub const TARGET_UNSIGNED: Self =
        Self::new([&[T::TargetRegister], &[T::UnsignedImmediate], &[]]);
    /// `rt, imm32` (li).
    pub const TARGET_INTEGER: Self = Self::new([&[T::TargetRegister], &[T::Integer], &[]]);
    /// `rt, address` (loads, stores, la).
    pub const TARGET_ADDRESS: Self = Self::new([&[T::TargetRegister], &[T::Address], &[]]);
    /// `rs, rt, label` (two-register branches).
    pub const SRC_TARGET_LABEL: Self =
        Self::new([&[T::SrcRegister], &[T::TargetRegister], &[T::Label]]);
    /// `rs, label` (compare-with-zero branches).
    pub const SRC_LABEL: Self = Self::new([&[T::SrcRegister], &[T::Label], &[]]);
    /// `label` (jumps).
    pub const LABEL: Self = Self::new([&[T::Label], &[], &[]]);

    /// Builds a format from per-position accepted-type sets.
    pub const fn new(slots: [&'static [OperandType]; 3]) -> Self {
        Self { slots }
    }

    /// Number of operands the format requires.
    pub fn arity(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Accepted types at `position`; empty if the position must be absent.
    pub fn slot(&self, position: usize) -> &'static [OperandType] {
        self.slots.get(position).copied().unwrap_or(&[])
    }

    /// Validates an operand list against this format.
    ///
    /// # Arguments
    ///
    /// * `operands` - The operands in source order.
    /// * `permissive` - Accept 32-bit integers in immediate slots.
    ///
    /// # Returns
    ///
    /// The first mismatch found, count mismatches first.
    pub fn validate(&self, operands: &[Operand], permissive: bool) -> Result<(), FormatMismatch> {
        let expected = self.arity();
        if operands.len() != expected {
            return Err(FormatMismatch::Count {
                expected,
                found: operands.len(),
            });
        }
        for (position, operand) in operands.iter().enumerate() {
            let accepted = self.slot(position);
            let found = operand.operand_type();
            if !accepted.iter().any(|slot| slot.accepts(found, permissive)) {
                return Err(FormatMismatch::Type {
                    position,
                    expected: accepted,
                    found,
                });
            }
        }
        Ok(())
    }
}
