//! The resolved program image.
//!
//! A `Program` is produced once by the assembler and is immutable afterwards. It owns the
//! text-segment statements, the data-segment variables, the label table and the
//! address-to-line map consumed by the execution engine and by observers.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::common::addr::Address;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::word::Word;
use crate::isa::instruction::Instruction;
use crate::isa::operand::Operand;

/// What a label is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LabelKind {
    /// Attached to a text-segment statement.
    Instruction,
    /// Attached to a data-segment variable.
    Variable,
}

/// A declared label.
///
/// Labels are unique by name across both segments, so equality and hashing consider the
/// name only; this lets the label table be queried with a plain `&str`.
#[derive(Clone, Debug, Serialize)]
pub struct Label {
    /// Label name as written in the source.
    pub name: String,
    /// Line of the declaration.
    pub line: u32,
    /// Whether the label names an instruction or a variable.
    pub kind: LabelKind,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.name
    }
}

/// One text-segment instruction with its operands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Opcode.
    pub instruction: Instruction,
    /// Operands in source order.
    pub operands: Vec<Operand>,
    /// Source line.
    pub line: u32,
}

impl Statement {
    /// Creates a statement.
    pub const fn new(instruction: Instruction, operands: Vec<Operand>, line: u32) -> Self {
        Self {
            instruction,
            operands,
            line,
        }
    }
}

/// Data type of a data-segment variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// `.byte`
    Byte,
    /// `.half`
    Half,
    /// `.word`
    Word,
    /// `.ascii`
    Ascii,
    /// `.asciiz`
    Asciiz,
    /// `.space`
    Space,
}

impl DataType {
    /// Size in bytes of one scalar of this type, or `None` for sized-by-content types.
    pub const fn scalar_size(self) -> Option<u32> {
        match self {
            Self::Byte => Some(1),
            Self::Half => Some(2),
            Self::Word => Some(4),
            Self::Ascii | Self::Asciiz | Self::Space => None,
        }
    }
}

/// One data-segment variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Declared type.
    pub data_type: DataType,
    /// Size in bytes; the next variable starts this many bytes later.
    pub size: u32,
    /// Initial value; `None` means zero-filled.
    pub value: Option<Operand>,
    /// Source line.
    pub line: u32,
}

impl Variable {
    /// Encodes the initial value as big-endian bytes, exactly `size` bytes long.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = match (&self.value, self.data_type) {
            (Some(Operand::Integer(v)), DataType::Byte) => vec![*v as u8],
            (Some(Operand::Integer(v)), DataType::Half) => {
                Word::from_signed(*v).to_half_bytes().to_vec()
            }
            (Some(Operand::Integer(v)), DataType::Word) => {
                Word::from_signed(*v).to_bytes().to_vec()
            }
            (Some(Operand::String(s)), DataType::Ascii | DataType::Asciiz) => s.as_bytes().to_vec(),
            _ => Vec::new(),
        };
        bytes.resize(self.size as usize, 0);
        bytes
    }
}

/// An addressed, linked program.
#[derive(Clone, Debug)]
pub struct Program {
    statements: BTreeMap<usize, Statement>,
    variables: BTreeMap<usize, Variable>,
    labels: HashMap<Label, Address>,
    lines: BTreeMap<Address, u32>,
    source_hash: u64,
    text_base: Address,
    data_base: Address,
}

impl Program {
    /// Assembles the image from linked parts. Only the assembler driver calls this.
    pub(crate) fn new(
        statements: BTreeMap<usize, Statement>,
        variables: BTreeMap<usize, Variable>,
        labels: HashMap<Label, Address>,
        lines: BTreeMap<Address, u32>,
        source_hash: u64,
        text_base: Address,
        data_base: Address,
    ) -> Self {
        Self {
            statements,
            variables,
            labels,
            lines,
            source_hash,
            text_base,
            data_base,
        }
    }

    /// Statements by index.
    pub const fn statements(&self) -> &BTreeMap<usize, Statement> {
        &self.statements
    }

    /// Variables by index.
    pub const fn variables(&self) -> &BTreeMap<usize, Variable> {
        &self.variables
    }

    /// Label table.
    pub const fn labels(&self) -> &HashMap<Label, Address> {
        &self.labels
    }

    /// Address-to-source-line map for both segments.
    pub const fn lines(&self) -> &BTreeMap<Address, u32> {
        &self.lines
    }

    /// Hash of the source text the program was assembled from.
    pub const fn source_hash(&self) -> u64 {
        self.source_hash
    }

    /// First text-segment address.
    pub const fn text_base(&self) -> Address {
        self.text_base
    }

    /// First address past the last statement.
    pub fn text_end(&self) -> Address {
        self.text_base
            .advance(self.statements.len() as u32 * INSTRUCTION_SIZE)
    }

    /// First data-segment address.
    pub const fn data_base(&self) -> Address {
        self.data_base
    }

    /// Resolves a label name to its absolute address.
    pub fn label_address(&self, name: &str) -> Option<Address> {
        self.labels.get(name).copied()
    }

    /// Looks up the full label record by name.
    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.get_key_value(name).map(|(label, _)| label)
    }

    /// Source line of the statement or variable at `addr`.
    pub fn line_of(&self, addr: Address) -> Option<u32> {
        self.lines.get(&addr).copied()
    }

    /// Returns the statement stored at a text-segment address.
    ///
    /// # Returns
    ///
    /// `None` if the address is misaligned or outside the text segment.
    pub fn statement_at(&self, addr: Address) -> Option<&Statement> {
        let offset = addr.distance_from(self.text_base);
        if offset < 0 || offset % i64::from(INSTRUCTION_SIZE) != 0 {
            return None;
        }
        let index = usize::try_from(offset / i64::from(INSTRUCTION_SIZE)).ok()?;
        self.statements.get(&index)
    }

    /// Initial contents of the static data segment, starting at `data_base`.
    pub fn data_image(&self) -> Vec<u8> {
        self.variables.values().flat_map(Variable::encode).collect()
    }
}
