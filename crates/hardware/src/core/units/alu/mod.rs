//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU used by the execute stage. Operations are
//! organized into submodules by category:
//! - [`arithmetic`]: Add, Addu, Sub, Subu, plus the multiply/divide unit
//! - [`logic`]:      And, Or, Xor, Nor, Slt, Sltu, Lui
//! - [`shifts`]:     Sll, Srl, Sra
//!
//! Checked operations report 32-bit two's-complement overflow by returning `None`;
//! unsigned variants wrap and never fail.

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// Bitwise logical and comparison operations.
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::common::word::Word;
use crate::isa::instruction::Instruction;

/// ALU operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Signed add, traps on overflow.
    Add,
    /// Wrapping add.
    Addu,
    /// Signed subtract, traps on overflow.
    Sub,
    /// Wrapping subtract.
    Subu,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NOR.
    Nor,
    /// Signed set-less-than.
    Slt,
    /// Unsigned set-less-than.
    Sltu,
    /// Shift left logical.
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Load upper immediate (`a << 16`).
    Lui,
}

impl AluOp {
    /// Maps an ALU-style opcode to its operation; `None` for non-ALU opcodes.
    pub const fn from_instruction(op: Instruction) -> Option<Self> {
        use Instruction as I;
        Some(match op {
            I::Add | I::Addi => Self::Add,
            I::Addu | I::Addiu | I::Move => Self::Addu,
            I::Sub => Self::Sub,
            I::Subu => Self::Subu,
            I::And | I::Andi => Self::And,
            I::Or | I::Ori => Self::Or,
            I::Xor | I::Xori => Self::Xor,
            I::Nor => Self::Nor,
            I::Slt | I::Slti => Self::Slt,
            I::Sltu | I::Sltiu => Self::Sltu,
            I::Sll | I::Sllv => Self::Sll,
            I::Srl | I::Srlv => Self::Srl,
            I::Sra | I::Srav => Self::Sra,
            I::Lui => Self::Lui,
            _ => return None,
        })
    }
}

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform
    /// * `a`  - First operand (the value shifted by shift operations)
    /// * `b`  - Second operand (shift amount for shifts, ignored by `Lui`)
    ///
    /// # Returns
    ///
    /// The result, or `None` if a checked operation overflowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mipsim_core::common::Word;
    /// use mipsim_core::core::units::alu::{Alu, AluOp};
    ///
    /// let r = Alu::execute(AluOp::Add, Word::from_signed(42), Word::from_signed(8));
    /// assert_eq!(r, Some(Word::from_signed(50)));
    ///
    /// // Checked add overflows, the unsigned variant wraps.
    /// let max = Word::from_signed(i32::MAX);
    /// assert_eq!(Alu::execute(AluOp::Add, max, Word::from_signed(1)), None);
    /// assert_eq!(
    ///     Alu::execute(AluOp::Addu, max, Word::from_signed(1)),
    ///     Some(Word::from_unsigned(0x8000_0000))
    /// );
    ///
    /// let r = Alu::execute(AluOp::Sll, Word::from_signed(1), Word::from_signed(4));
    /// assert_eq!(r, Some(Word::from_signed(16)));
    /// ```
    pub fn execute(op: AluOp, a: Word, b: Word) -> Option<Word> {
        match op {
            AluOp::Add | AluOp::Addu | AluOp::Sub | AluOp::Subu => arithmetic::execute(op, a, b),
            AluOp::And
            | AluOp::Or
            | AluOp::Xor
            | AluOp::Nor
            | AluOp::Slt
            | AluOp::Sltu
            | AluOp::Lui => Some(logic::execute(op, a, b)),
            AluOp::Sll | AluOp::Srl | AluOp::Sra => Some(shifts::execute(op, a, b)),
        }
    }
}
