//! Hazard Detection.
//!
//! This module classifies the dependencies between in-flight instructions of the
//! three-slot pipeline. It provides:
//! 1. **Register Sets:** The registers each statement reads and writes, `hi`/`lo` included.
//! 2. **Data Hazards:** RAW and WAW between the instruction entering decode and the one
//!    entering execute; RAW takes priority when both apply.
//! 3. **Control Hazards:** Branches and jumps in flight block speculative fetch.

use serde::Serialize;

use crate::common::reg::RegRef;
use crate::isa::abi::{REG_ARG0, REG_ARG1, REG_LINK, REG_SYSCALL};
use crate::isa::instruction::Instruction;
use crate::isa::operand::Operand;
use crate::isa::program::Statement;

/// Kind of pipeline hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HazardKind {
    /// Read after write.
    Raw,
    /// Write after write.
    Waw,
    /// Branch or jump in flight.
    Control,
}

fn gpr(operands: &[Operand], position: usize) -> Option<RegRef> {
    match operands.get(position) {
        Some(Operand::Register(reg)) if !reg.is_zero() => Some(RegRef::Gpr(*reg)),
        _ => None,
    }
}

fn base(operands: &[Operand], position: usize) -> Option<RegRef> {
    match operands.get(position) {
        Some(Operand::Address(addr)) => addr
            .base
            .filter(|reg| !reg.is_zero())
            .map(RegRef::Gpr),
        _ => None,
    }
}

/// Registers a statement reads.
pub fn reads(statement: &Statement) -> Vec<RegRef> {
    use Instruction as I;
    let ops = &statement.operands;
    let regs = match statement.instruction {
        I::Add
        | I::Addu
        | I::Sub
        | I::Subu
        | I::And
        | I::Or
        | I::Xor
        | I::Nor
        | I::Slt
        | I::Sltu
        | I::Sllv
        | I::Srlv
        | I::Srav => vec![gpr(ops, 1), gpr(ops, 2)],
        I::Sll
        | I::Srl
        | I::Sra
        | I::Move
        | I::Addi
        | I::Addiu
        | I::Slti
        | I::Sltiu
        | I::Andi
        | I::Ori
        | I::Xori => vec![gpr(ops, 1)],
        I::Mult | I::Multu | I::Div | I::Divu | I::Beq | I::Bne => vec![gpr(ops, 0), gpr(ops, 1)],
        I::Mfhi => vec![Some(RegRef::Hi)],
        I::Mflo => vec![Some(RegRef::Lo)],
        I::Mthi | I::Mtlo | I::Blez | I::Bgtz | I::Bltz | I::Bgez | I::Jr | I::Jalr => {
            vec![gpr(ops, 0)]
        }
        I::Lw | I::Lh | I::Lhu | I::Lb | I::Lbu | I::La => vec![base(ops, 1)],
        I::Sw | I::Sh | I::Sb => vec![gpr(ops, 0), base(ops, 1)],
        I::Syscall => vec![
            Some(RegRef::Gpr(REG_SYSCALL)),
            Some(RegRef::Gpr(REG_ARG0)),
            Some(RegRef::Gpr(REG_ARG1)),
        ],
        I::Lui | I::J | I::Jal | I::Li | I::Nop | I::Break => Vec::new(),
    };
    regs.into_iter().flatten().collect()
}

/// Registers a statement writes.
pub fn writes(statement: &Statement) -> Vec<RegRef> {
    use Instruction as I;
    let ops = &statement.operands;
    let regs = match statement.instruction {
        I::Mult | I::Multu | I::Div | I::Divu => vec![Some(RegRef::Hi), Some(RegRef::Lo)],
        I::Mthi => vec![Some(RegRef::Hi)],
        I::Mtlo => vec![Some(RegRef::Lo)],
        I::Jal | I::Jalr => vec![Some(RegRef::Gpr(REG_LINK))],
        I::Syscall => vec![Some(RegRef::Gpr(REG_SYSCALL))],
        I::Beq
        | I::Bne
        | I::Blez
        | I::Bgtz
        | I::Bltz
        | I::Bgez
        | I::J
        | I::Jr
        | I::Sw
        | I::Sh
        | I::Sb
        | I::Nop
        | I::Break => Vec::new(),
        _ => vec![gpr(ops, 0)],
    };
    regs.into_iter().flatten().collect()
}

/// Classifies the data hazard between the instruction entering decode and the one
/// entering execute in the same tick.
///
/// # Arguments
///
/// * `decoding` - The younger instruction, about to read its operands.
/// * `executing` - The older instruction, not yet retired.
///
/// # Returns
///
/// `Raw` if `decoding` reads a register `executing` writes, otherwise `Waw` if both
/// write the same register, otherwise `None`.
pub fn detect_data(decoding: &Statement, executing: &Statement) -> Option<HazardKind> {
    let written = writes(executing);
    if written.is_empty() {
        return None;
    }
    if reads(decoding).iter().any(|r| written.contains(r)) {
        return Some(HazardKind::Raw);
    }
    if writes(decoding).iter().any(|w| written.contains(w)) {
        return Some(HazardKind::Waw);
    }
    None
}

/// `true` if fetching past `decoding` would be speculative.
pub const fn is_control(decoding: &Statement) -> bool {
    decoding.instruction.is_control()
}
