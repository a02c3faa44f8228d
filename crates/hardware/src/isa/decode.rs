//! Statement Decoder.
//!
//! This module converts a linked `Statement` into the internal execution format that
//! matches its addressing mode. Register operands are read from the register file at
//! decode time, labels are resolved against the program's label table, and each
//! internal format carries only the fields its addressing mode needs:
//! 1. **RType:** Destination register plus up to two source values (also immediate ALU ops).
//! 2. **IType:** Up to two comparison values plus a branch target.
//! 3. **JType:** Jump target plus an optional return-link value.
//! 4. **LsType:** Loads, stores, `li` and `la`.
//! 5. **Special:** `syscall`, `nop`, `break`.

use serde::Serialize;

use crate::common::addr::Address;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::SimError;
use crate::common::reg::{Register, RegisterFile};
use crate::common::word::Word;
use crate::isa::instruction::Instruction;
use crate::isa::operand::{AddressOperand, Operand};
use crate::isa::program::{Program, Statement};

/// Internal format family, reported to observers at decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionKind {
    /// Register/ALU format.
    R,
    /// Conditional branch format.
    I,
    /// Jump format.
    J,
    /// Load/store format.
    Ls,
    /// No-operand format.
    Special,
}

/// ALU-style operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RType {
    /// Opcode.
    pub op: Instruction,
    /// Register written with the result, if any (`None` for `mult`, `mthi`, ...).
    pub dest: Option<Register>,
    /// First source value.
    pub source1: Option<Word>,
    /// Second source value (register value, immediate or shift amount).
    pub source2: Option<Word>,
}

/// Conditional branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IType {
    /// Opcode.
    pub op: Instruction,
    /// First comparison value.
    pub value1: Option<Word>,
    /// Second comparison value (`beq`/`bne` only).
    pub value2: Option<Word>,
    /// Branch target when taken.
    pub target: Option<Address>,
}

/// Unconditional jump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JType {
    /// Opcode.
    pub op: Instruction,
    /// Jump target.
    pub target: Address,
    /// Return address written to `$ra` for call-style jumps.
    pub link: Option<Word>,
}

/// Load, store, load-immediate or load-address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LsType {
    /// Opcode.
    pub op: Instruction,
    /// Value to store (zero for loads).
    pub value: Word,
    /// Register written by loads, `li` and `la`.
    pub dest: Option<Register>,
    /// Effective memory address (loads, stores, `la`).
    pub address: Option<Address>,
    /// Immediate loaded by `li`.
    pub immediate: Option<Word>,
}

/// Operation without operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Special {
    /// Opcode.
    pub op: Instruction,
}

/// A decoded instruction ready for execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Register/ALU format.
    RType(RType),
    /// Conditional branch format.
    IType(IType),
    /// Jump format.
    JType(JType),
    /// Load/store format.
    LsType(LsType),
    /// No-operand format.
    Special(Special),
}

impl Decoded {
    /// Format family of this instruction.
    pub const fn kind(&self) -> InstructionKind {
        match self {
            Self::RType(_) => InstructionKind::R,
            Self::IType(_) => InstructionKind::I,
            Self::JType(_) => InstructionKind::J,
            Self::LsType(_) => InstructionKind::Ls,
            Self::Special(_) => InstructionKind::Special,
        }
    }
}

/// Operand accessor that turns shape errors into decode exceptions.
struct Operands<'a> {
    statement: &'a Statement,
    address: Address,
}

impl Operands<'_> {
    fn error(&self, message: String) -> SimError {
        SimError::Decode {
            address: self.address,
            message,
        }
    }

    fn get(&self, position: usize) -> Result<&Operand, SimError> {
        self.statement.operands.get(position).ok_or_else(|| {
            self.error(format!(
                "{} is missing operand {}",
                self.statement.instruction,
                position + 1
            ))
        })
    }

    fn register(&self, position: usize) -> Result<Register, SimError> {
        match self.get(position)? {
            Operand::Register(reg) => Ok(*reg),
            other => Err(self.error(format!(
                "operand {} must be a register, found {other}",
                position + 1
            ))),
        }
    }

    fn integer(&self, position: usize) -> Result<Word, SimError> {
        match self.get(position)? {
            Operand::Integer(value) => Ok(Word::from_signed(*value)),
            other => Err(self.error(format!(
                "operand {} must be an integer, found {other}",
                position + 1
            ))),
        }
    }

    fn address_operand(&self, position: usize) -> Result<&AddressOperand, SimError> {
        match self.get(position)? {
            Operand::Address(addr) => Ok(addr),
            other => Err(self.error(format!(
                "operand {} must be an address, found {other}",
                position + 1
            ))),
        }
    }
}

/// Computes the effective address of an address operand.
///
/// The label address (if any), the constant offset (if any) and the base register
/// value (if any) are summed with 32-bit wrapping.
///
/// # Errors
///
/// Returns a decode error if the label is not in the program's label table.
pub fn effective_address(
    operand: &AddressOperand,
    regs: &RegisterFile,
    program: &Program,
    at: Address,
) -> Result<Address, SimError> {
    let mut addr = Address::new(0);
    if let Some(label) = &operand.label {
        addr = program.label_address(label).ok_or_else(|| SimError::Decode {
            address: at,
            message: format!("unknown label '{label}'"),
        })?;
    }
    if let Some(offset) = operand.offset {
        addr = addr.offset(offset);
    }
    if let Some(base) = operand.base {
        addr = addr.advance(regs.read(base).unsigned());
    }
    Ok(addr)
}

/// Decodes a statement fetched from `address`.
///
/// # Arguments
///
/// * `statement` - The statement to decode.
/// * `address` - Its text-segment address (used for links and error locations).
/// * `regs` - Register file to read source operands from.
/// * `program` - Program whose label table resolves label operands.
///
/// # Errors
///
/// Returns `SimError::Decode` if an operand has the wrong shape or references an
/// unknown label.
pub fn decode(
    statement: &Statement,
    address: Address,
    regs: &RegisterFile,
    program: &Program,
) -> Result<Decoded, SimError> {
    use Instruction as I;

    let ops = Operands { statement, address };
    let op = statement.instruction;
    let read = |position: usize| -> Result<Word, SimError> { Ok(regs.read(ops.register(position)?)) };
    let target = |position: usize| -> Result<Address, SimError> {
        effective_address(ops.address_operand(position)?, regs, program, address)
    };
    let link = Some(Word::from_unsigned(
        address.advance(INSTRUCTION_SIZE).val(),
    ));

    let decoded = match op {
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
        | I::Srav => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(read(1)?),
            source2: Some(read(2)?),
        }),
        I::Sll
        | I::Srl
        | I::Sra
        | I::Addi
        | I::Addiu
        | I::Slti
        | I::Sltiu
        | I::Andi
        | I::Ori
        | I::Xori => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(read(1)?),
            source2: Some(ops.integer(2)?),
        }),
        I::Mult | I::Multu | I::Div | I::Divu => Decoded::RType(RType {
            op,
            dest: None,
            source1: Some(read(0)?),
            source2: Some(read(1)?),
        }),
        I::Mfhi => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(regs.hi),
            source2: None,
        }),
        I::Mflo => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(regs.lo),
            source2: None,
        }),
        I::Mthi | I::Mtlo => Decoded::RType(RType {
            op,
            dest: None,
            source1: Some(read(0)?),
            source2: None,
        }),
        I::Move => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(read(1)?),
            source2: None,
        }),
        I::Lui => Decoded::RType(RType {
            op,
            dest: Some(ops.register(0)?),
            source1: Some(ops.integer(1)?),
            source2: None,
        }),
        I::Beq | I::Bne => Decoded::IType(IType {
            op,
            value1: Some(read(0)?),
            value2: Some(read(1)?),
            target: Some(target(2)?),
        }),
        I::Blez | I::Bgtz | I::Bltz | I::Bgez => Decoded::IType(IType {
            op,
            value1: Some(read(0)?),
            value2: None,
            target: Some(target(1)?),
        }),
        I::J => Decoded::JType(JType {
            op,
            target: target(0)?,
            link: None,
        }),
        I::Jal => Decoded::JType(JType {
            op,
            target: target(0)?,
            link,
        }),
        I::Jr => Decoded::JType(JType {
            op,
            target: Address::new(read(0)?.unsigned()),
            link: None,
        }),
        I::Jalr => Decoded::JType(JType {
            op,
            target: Address::new(read(0)?.unsigned()),
            link,
        }),
        I::Lw | I::Lh | I::Lhu | I::Lb | I::Lbu => Decoded::LsType(LsType {
            op,
            value: Word::ZERO,
            dest: Some(ops.register(0)?),
            address: Some(target(1)?),
            immediate: None,
        }),
        I::Sw | I::Sh | I::Sb => Decoded::LsType(LsType {
            op,
            value: read(0)?,
            dest: None,
            address: Some(target(1)?),
            immediate: None,
        }),
        I::Li => Decoded::LsType(LsType {
            op,
            value: Word::ZERO,
            dest: Some(ops.register(0)?),
            address: None,
            immediate: Some(ops.integer(1)?),
        }),
        I::La => Decoded::LsType(LsType {
            op,
            value: Word::ZERO,
            dest: Some(ops.register(0)?),
            address: Some(target(1)?),
            immediate: None,
        }),
        I::Syscall | I::Nop | I::Break => Decoded::Special(Special { op }),
    };
    Ok(decoded)
}
