//! ALU arithmetic operations.
//!
//! Addition and subtraction come in checked (`Add`, `Sub`) and wrapping (`Addu`,
//! `Subu`) forms. The multiply/divide unit produces a `(hi, lo)` pair.

use crate::common::word::Word;
use crate::core::units::alu::AluOp;

/// Number of bits in a word (used to split 64-bit products).
const WORD_BITS: u32 = 32;

/// Executes an add/subtract operation.
///
/// # Returns
///
/// `None` on signed overflow of a checked operation, or for non-arithmetic opcodes.
pub fn execute(op: AluOp, a: Word, b: Word) -> Option<Word> {
    match op {
        AluOp::Add => a.checked_add(b),
        AluOp::Addu => Some(a.wrapping_add(b)),
        AluOp::Sub => a.checked_sub(b),
        AluOp::Subu => Some(a.wrapping_sub(b)),
        _ => None,
    }
}

/// Multiplies two words into a 64-bit product.
///
/// # Returns
///
/// `(hi, lo)`: the upper and lower 32 bits of the product.
pub const fn multiply(a: Word, b: Word, signed: bool) -> (Word, Word) {
    let product = if signed {
        (a.signed() as i64 * b.signed() as i64) as u64
    } else {
        a.unsigned() as u64 * b.unsigned() as u64
    };
    (
        Word::from_unsigned((product >> WORD_BITS) as u32),
        Word::from_unsigned(product as u32),
    )
}

/// Divides `a` by `b`.
///
/// # Returns
///
/// `(hi, lo)` = (remainder, quotient), or `None` when `b` is zero. Signed division
/// of `i32::MIN` by `-1` wraps.
pub const fn divide(a: Word, b: Word, signed: bool) -> Option<(Word, Word)> {
    if b.unsigned() == 0 {
        return None;
    }
    if signed {
        let (x, y) = (a.signed(), b.signed());
        Some((
            Word::from_signed(x.wrapping_rem(y)),
            Word::from_signed(x.wrapping_div(y)),
        ))
    } else {
        let (x, y) = (a.unsigned(), b.unsigned());
        Some((Word::from_unsigned(x % y), Word::from_unsigned(x / y)))
    }
}
