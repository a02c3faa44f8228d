//! Syntax tree consumed by the program extractor.
//!
//! The tree is deliberately flat: a program is a sequence of nodes in source order,
//! each tagged with the source location it was parsed from. Operand nodes keep their
//! literal text; interpretation (integer radix, register names, escapes) happens in the
//! operand extractor.

use std::fmt;

use serde::Serialize;

/// Source location of a node: 1-based line and 1-based column range `[start, end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Source line.
    pub line: u32,
    /// First column.
    pub start: usize,
    /// Column one past the end.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    pub const fn new(line: u32, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    /// A span covering a whole line, for nodes built without column information.
    pub const fn line(line: u32) -> Self {
        Self {
            line,
            start: 1,
            end: 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.start)
    }
}

/// Which segment a segment directive enters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SegmentKind {
    /// `.text`
    Text,
    /// `.data`
    Data,
}

/// Literal operand as written in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum OperandKind {
    /// Integer literal text, sign included (`-12`, `0x1F`).
    Integer(String),
    /// String literal body, delimiters stripped, escapes untouched.
    String(String),
    /// Register text including the `$` prefix.
    Register(String),
    /// Memory reference; every part is optional.
    Address {
        /// Label name.
        label: Option<String>,
        /// Constant displacement text, sign included.
        offset: Option<String>,
        /// Base register text including the `$` prefix.
        base: Option<String>,
    },
}

/// An operand node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OperandNode {
    /// Literal content.
    pub kind: OperandKind,
    /// Location.
    pub span: Span,
}

impl OperandNode {
    /// Creates an operand node.
    pub const fn new(kind: OperandKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Kind of a top-level node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// Segment switch.
    Segment(SegmentKind),
    /// Any other directive; `name` excludes the leading dot.
    Directive {
        /// Directive name.
        name: String,
        /// Operands in source order.
        operands: Vec<OperandNode>,
    },
    /// Label declaration; `name` excludes the colon.
    Label(String),
    /// Instruction statement.
    Statement {
        /// Mnemonic text as written.
        mnemonic: String,
        /// Operands in source order.
        operands: Vec<OperandNode>,
    },
}

/// A top-level node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Content.
    pub kind: NodeKind,
    /// Location.
    pub span: Span,
}

impl Node {
    /// Creates a node.
    pub const fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A parsed program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    /// Nodes in source order.
    pub nodes: Vec<Node>,
    /// Hash of the source text the tree was parsed from.
    pub source_hash: u64,
}

impl SyntaxTree {
    /// Creates a tree from nodes with an explicit source hash.
    pub const fn new(nodes: Vec<Node>, source_hash: u64) -> Self {
        Self { nodes, source_hash }
    }
}
