//! Operand extractor.
//!
//! Converts operand nodes of the syntax tree into typed `Operand`s:
//! 1. **Integers:** Decimal or hex literals with optional sign, truncated to the low 32 bits.
//! 2. **Strings:** Delimiter-stripped text with backslash escapes decoded.
//! 3. **Registers:** Resolved by symbolic name or numeric id through a `RegisterTable`.
//! 4. **Addresses:** Independently optional label, constant and base register.
//!
//! Unresolvable pieces are recorded as problems and yield no operand.

use crate::asm::problem::Problem;
use crate::asm::syntax::{OperandKind, OperandNode, Span};
use crate::common::reg::Register;
use crate::isa::abi::RegisterTable;
use crate::isa::operand::{AddressOperand, Operand};

/// Parses an integer literal, keeping the low 32 bits of its magnitude.
///
/// Accepts an optional `+`/`-` sign followed by decimal digits or a `0x`/`0X` hex
/// literal. Returns `None` for malformed text.
pub fn parse_integer(text: &str) -> Option<i32> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        _ => (10, digits),
    };
    if digits.is_empty() {
        return None;
    }
    let mut magnitude: u64 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(radix)?;
        magnitude = magnitude
            .wrapping_mul(u64::from(radix))
            .wrapping_add(u64::from(digit));
    }
    let low = magnitude as u32;
    Some(if negative {
        low.wrapping_neg() as i32
    } else {
        low as i32
    })
}

/// Decodes backslash escapes in a string literal body.
///
/// Recognized escapes are `\n`, `\t`, `\r`, `\0`, `\\`, `\"` and `\'`; any other
/// escaped character is kept as is.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Turns operand nodes into typed operands.
#[derive(Debug)]
pub struct OperandExtractor<'a> {
    registers: &'a RegisterTable,
}

impl<'a> OperandExtractor<'a> {
    /// Creates an extractor resolving register names through `registers`.
    pub const fn new(registers: &'a RegisterTable) -> Self {
        Self { registers }
    }

    /// Extracts one operand.
    ///
    /// # Arguments
    ///
    /// * `node` - The operand node.
    /// * `problems` - Sink for problems found while extracting.
    ///
    /// # Returns
    ///
    /// `None` if any part of the operand could not be resolved; the reason is in
    /// `problems`.
    pub fn extract(&self, node: &OperandNode, problems: &mut Vec<Problem>) -> Option<Operand> {
        match &node.kind {
            OperandKind::Integer(text) => {
                Self::integer(text, node.span, problems).map(Operand::Integer)
            }
            OperandKind::String(body) => Some(Operand::String(unescape(body))),
            OperandKind::Register(text) => {
                self.register(text, node.span, problems).map(Operand::Register)
            }
            OperandKind::Address {
                label,
                offset,
                base,
            } => {
                let offset = match offset {
                    Some(text) => Some(Self::integer(text, node.span, problems)?),
                    None => None,
                };
                let base = match base {
                    Some(text) => Some(self.register(text, node.span, problems)?),
                    None => None,
                };
                Some(Operand::Address(AddressOperand {
                    label: label.clone(),
                    offset,
                    base,
                }))
            }
        }
    }

    /// Extracts every operand of a node list, dropping the unresolvable ones.
    pub fn extract_all(&self, nodes: &[OperandNode], problems: &mut Vec<Problem>) -> Vec<Operand> {
        nodes
            .iter()
            .filter_map(|node| self.extract(node, problems))
            .collect()
    }

    fn integer(text: &str, span: Span, problems: &mut Vec<Problem>) -> Option<i32> {
        let value = parse_integer(text);
        if value.is_none() {
            problems.push(Problem::at(format!("invalid integer literal '{text}'"), span));
        }
        value
    }

    fn register(&self, text: &str, span: Span, problems: &mut Vec<Problem>) -> Option<Register> {
        let reg = self.registers.resolve(text);
        if reg.is_none() {
            problems.push(Problem::at(format!("unknown register '{text}'"), span));
        }
        reg
    }
}
