//! Statement disassembler.
//!
//! Renders statements back into assembly text for debug tracing, the interactive
//! stepper and test diagnostics.

use std::fmt;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::program::{Program, Statement};

/// Formats a statement as `mnemonic op1, op2, op3`.
///
/// ```
/// use mipsim_core::common::Register;
/// use mipsim_core::isa::disasm::disassemble;
/// use mipsim_core::isa::instruction::Instruction;
/// use mipsim_core::isa::operand::Operand;
/// use mipsim_core::isa::program::Statement;
///
/// let st = Statement::new(
///     Instruction::Addi,
///     vec![
///         Operand::Register(Register::T0),
///         Operand::Register(Register::ZERO),
///         Operand::Integer(5),
///     ],
///     1,
/// );
/// assert_eq!(disassemble(&st), "addi $8, $0, 5");
/// ```
pub fn disassemble(statement: &Statement) -> String {
    statement.to_string()
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instruction)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        Ok(())
    }
}

/// Produces a listing of the text segment: one `address: line: statement` row each.
pub fn listing(program: &Program) -> Vec<String> {
    program
        .statements()
        .values()
        .enumerate()
        .map(|(index, st)| {
            let addr = program
                .text_base()
                .advance((index as u32).wrapping_mul(INSTRUCTION_SIZE));
            format!("{addr}: {:>4}: {st}", st.line)
        })
        .collect()
}
