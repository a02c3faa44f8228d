//! ALU shift operations.
//!
//! Shift amounts are masked to 5 bits (0–31).

use crate::common::word::Word;
use crate::core::units::alu::AluOp;

/// Bit mask for the shift amount.
const SHAMT_MASK: u32 = 0x1f;

/// Shifts `a` by the low five bits of `b`; non-shift opcodes yield zero.
pub const fn execute(op: AluOp, a: Word, b: Word) -> Word {
    let sh = b.unsigned() & SHAMT_MASK;
    match op {
        AluOp::Sll => Word::from_unsigned(a.unsigned() << sh),
        AluOp::Srl => Word::from_unsigned(a.unsigned() >> sh),
        AluOp::Sra => Word::from_signed(a.signed() >> sh),
        _ => Word::ZERO,
    }
}
