//! The MIPS instruction set.
//!
//! A fixed enumerated opcode set. Each opcode knows its mnemonic, the operand format it
//! is bound to, and the registers it implicitly reads or writes (used by hazard detection).

use std::fmt;

use serde::Serialize;

use crate::isa::format::OperandFormat;

/// Every opcode the assembler accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum Instruction {
    // Register arithmetic / logic
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Sllv,
    Srlv,
    Srav,
    Sll,
    Srl,
    Sra,
    Mult,
    Multu,
    Div,
    Divu,
    Mfhi,
    Mflo,
    Mthi,
    Mtlo,
    Move,
    // Immediate arithmetic / logic
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    // Branches
    Beq,
    Bne,
    Blez,
    Bgtz,
    Bltz,
    Bgez,
    // Jumps
    J,
    Jal,
    Jr,
    Jalr,
    // Loads / stores
    Lw,
    Lh,
    Lhu,
    Lb,
    Lbu,
    Sw,
    Sh,
    Sb,
    Li,
    La,
    // Special
    Syscall,
    Nop,
    Break,
}

impl Instruction {
    /// Every opcode, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Add,
        Self::Addu,
        Self::Sub,
        Self::Subu,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Nor,
        Self::Slt,
        Self::Sltu,
        Self::Sllv,
        Self::Srlv,
        Self::Srav,
        Self::Sll,
        Self::Srl,
        Self::Sra,
        Self::Mult,
        Self::Multu,
        Self::Div,
        Self::Divu,
        Self::Mfhi,
        Self::Mflo,
        Self::Mthi,
        Self::Mtlo,
        Self::Move,
        Self::Addi,
        Self::Addiu,
        Self::Slti,
        Self::Sltiu,
        Self::Andi,
        Self::Ori,
        Self::Xori,
        Self::Lui,
        Self::Beq,
        Self::Bne,
        Self::Blez,
        Self::Bgtz,
        Self::Bltz,
        Self::Bgez,
        Self::J,
        Self::Jal,
        Self::Jr,
        Self::Jalr,
        Self::Lw,
        Self::Lh,
        Self::Lhu,
        Self::Lb,
        Self::Lbu,
        Self::Sw,
        Self::Sh,
        Self::Sb,
        Self::Li,
        Self::La,
        Self::Syscall,
        Self::Nop,
        Self::Break,
    ];

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Addu => "addu",
            Self::Sub => "sub",
            Self::Subu => "subu",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Nor => "nor",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Sllv => "sllv",
            Self::Srlv => "srlv",
            Self::Srav => "srav",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Mult => "mult",
            Self::Multu => "multu",
            Self::Div => "div",
            Self::Divu => "divu",
            Self::Mfhi => "mfhi",
            Self::Mflo => "mflo",
            Self::Mthi => "mthi",
            Self::Mtlo => "mtlo",
            Self::Move => "move",
            Self::Addi => "addi",
            Self::Addiu => "addiu",
            Self::Slti => "slti",
            Self::Sltiu => "sltiu",
            Self::Andi => "andi",
            Self::Ori => "ori",
            Self::Xori => "xori",
            Self::Lui => "lui",
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Blez => "blez",
            Self::Bgtz => "bgtz",
            Self::Bltz => "bltz",
            Self::Bgez => "bgez",
            Self::J => "j",
            Self::Jal => "jal",
            Self::Jr => "jr",
            Self::Jalr => "jalr",
            Self::Lw => "lw",
            Self::Lh => "lh",
            Self::Lhu => "lhu",
            Self::Lb => "lb",
            Self::Lbu => "lbu",
            Self::Sw => "sw",
            Self::Sh => "sh",
            Self::Sb => "sb",
            Self::Li => "li",
            Self::La => "la",
            Self::Syscall => "syscall",
            Self::Nop => "nop",
            Self::Break => "break",
        }
    }

    /// Looks up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|i| i.mnemonic() == lower)
    }

    /// The operand format this opcode is bound to.
    pub const fn format(self) -> OperandFormat {
        match self {
            Self::Add
            | Self::Addu
            | Self::Sub
            | Self::Subu
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Nor
            | Self::Slt
            | Self::Sltu
            | Self::Sllv
            | Self::Srlv
            | Self::Srav => OperandFormat::DEST_SRC_TARGET,
            Self::Sll | Self::Srl | Self::Sra => OperandFormat::DEST_SRC_SHIFT,
            Self::Mult | Self::Multu | Self::Div | Self::Divu => OperandFormat::SRC_TARGET,
            Self::Mfhi | Self::Mflo => OperandFormat::DEST,
            Self::Mthi | Self::Mtlo | Self::Jr | Self::Jalr => OperandFormat::SRC,
            Self::Move => OperandFormat::DEST_SRC,
            Self::Addi | Self::Addiu | Self::Slti | Self::Sltiu => {
                OperandFormat::TARGET_SRC_IMMEDIATE
            }
            Self::Andi | Self::Ori | Self::Xori => OperandFormat::TARGET_SRC_UNSIGNED,
            Self::Lui => OperandFormat::TARGET_UNSIGNED,
            Self::Beq | Self::Bne => OperandFormat::SRC_TARGET_LABEL,
            Self::Blez | Self::Bgtz | Self::Bltz | Self::Bgez => OperandFormat::SRC_LABEL,
            Self::J | Self::Jal => OperandFormat::LABEL,
            Self::Lw
            | Self::Lh
            | Self::Lhu
            | Self::Lb
            | Self::Lbu
            | Self::Sw
            | Self::Sh
            | Self::Sb
            | Self::La => OperandFormat::TARGET_ADDRESS,
            Self::Li => OperandFormat::TARGET_INTEGER,
            Self::Syscall | Self::Nop | Self::Break => OperandFormat::NONE,
        }
    }

    /// `true` for instructions that may redirect the program counter.
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::Beq
                | Self::Bne
                | Self::Blez
                | Self::Bgtz
                | Self::Bltz
                | Self::Bgez
                | Self::J
                | Self::Jal
                | Self::Jr
                | Self::Jalr
        )
    }

    /// `true` for stores (the first register operand is read, not written).
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sw | Self::Sh | Self::Sb)
    }

    /// `true` for loads from memory.
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Lw | Self::Lh | Self::Lhu | Self::Lb | Self::Lbu)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
