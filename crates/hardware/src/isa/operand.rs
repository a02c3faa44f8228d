//! Typed operands.
//!
//! An `Operand` is the extractor's typed view of one syntax-tree operand node. The
//! operand *type* used for format checking is derived from the value, never stored.

use std::fmt;

use serde::Serialize;

use crate::common::reg::Register;
use crate::isa::format::OperandType;

/// Largest value classified as an unsigned 16-bit immediate.
const UNSIGNED_IMMEDIATE_MAX: i32 = 0xFFFF;
/// Smallest value classified as a signed 16-bit immediate.
const IMMEDIATE_MIN: i32 = -0x8000;

/// A typed operand value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// An integer literal, already truncated to 32 bits.
    Integer(i32),
    /// A string literal with delimiters stripped and escapes decoded.
    String(String),
    /// A register reference.
    Register(Register),
    /// A label and/or base-offset memory reference.
    Address(AddressOperand),
}

/// Address expression: `label`, `label+const`, `const($base)`, `($base)`, `label($base)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddressOperand {
    /// Referenced label, if any.
    pub label: Option<String>,
    /// Signed constant displacement, if any.
    pub offset: Option<i32>,
    /// Base register, if any.
    pub base: Option<Register>,
}

impl AddressOperand {
    /// Label-only reference.
    pub fn label(name: impl Into<String>) -> Self {
        Self {
            label: Some(name.into()),
            ..Self::default()
        }
    }

    /// `offset($base)` reference.
    pub const fn base_offset(offset: i32, base: Register) -> Self {
        Self {
            label: None,
            offset: Some(offset),
            base: Some(base),
        }
    }

    /// `LABEL` when a label is given without a base register, `BASE_OFFSET` otherwise.
    pub const fn operand_type(&self) -> OperandType {
        if self.label.is_some() && self.base.is_none() {
            OperandType::Label
        } else {
            OperandType::BaseOffset
        }
    }
}

impl Operand {
    /// Derives the operand type used to check operand-format contracts.
    pub const fn operand_type(&self) -> OperandType {
        match self {
            Self::Integer(value) => classify_integer(*value),
            Self::String(_) => OperandType::String,
            Self::Register(_) => OperandType::Register,
            Self::Address(addr) => addr.operand_type(),
        }
    }

    /// Returns the label referenced by this operand, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Address(addr) => addr.label.as_deref(),
            _ => None,
        }
    }
}

/// Classifies an integer by the narrowest immediate class that holds it.
pub const fn classify_integer(value: i32) -> OperandType {
    if value >= 0 && value <= UNSIGNED_IMMEDIATE_MAX {
        OperandType::UnsignedImmediate
    } else if value >= IMMEDIATE_MIN && value < 0 {
        OperandType::Immediate
    } else {
        OperandType::Integer
    }
}

impl fmt::Display for AddressOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}")?;
            if let Some(offset) = self.offset {
                write!(f, "{offset:+}")?;
            }
        } else if let Some(offset) = self.offset {
            write!(f, "{offset}")?;
        }
        if let Some(base) = self.base {
            write!(f, "({base})")?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(text) => write!(f, "{text:?}"),
            Self::Register(reg) => write!(f, "{reg}"),
            Self::Address(addr) => write!(f, "{addr}"),
        }
    }
}
