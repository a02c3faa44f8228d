//! ALU logical and comparison operations.
//!
//! Comparisons produce 0 or 1.

use crate::common::word::Word;
use crate::core::units::alu::AluOp;

/// Executes a logical or comparison operation; non-logic opcodes yield zero.
pub const fn execute(op: AluOp, a: Word, b: Word) -> Word {
    let (x, y) = (a.unsigned(), b.unsigned());
    let result = match op {
        AluOp::And => x & y,
        AluOp::Or => x | y,
        AluOp::Xor => x ^ y,
        AluOp::Nor => !(x | y),
        AluOp::Slt => (a.signed() < b.signed()) as u32,
        AluOp::Sltu => (x < y) as u32,
        AluOp::Lui => x << 16,
        _ => 0,
    };
    Word::from_unsigned(result)
}
