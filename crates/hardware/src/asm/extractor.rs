//! Program extractor.
//!
//! Walks the syntax tree once, tracking which segment it is in, validating every
//! directive and instruction against its operand contract and collecting all problems
//! along the way. It provides:
//! 1. **Segment State:** `Outside` until the first `.text`/`.data`, then the current segment.
//! 2. **Label Queue:** Labels wait as "outstanding" until the next statement or variable.
//! 3. **Directives:** Per-directive operand and segment checks producing variables.
//! 4. **Statements:** Opcode lookup and operand-format validation (stored even when invalid).
//! 5. **Final Checks:** `main` in the text segment and no dangling labels.

use std::collections::HashMap;

use tracing::debug;

use crate::asm::operand::OperandExtractor;
use crate::asm::problem::Problem;
use crate::asm::syntax::{Node, NodeKind, OperandNode, SegmentKind, Span, SyntaxTree};
use crate::isa::abi::RegisterTable;
use crate::isa::format::OperandType;
use crate::isa::instruction::Instruction;
use crate::isa::operand::Operand;
use crate::isa::program::{DataType, Label, LabelKind, Statement, Variable};

/// Name of the mandatory entry label.
pub const ENTRY_LABEL: &str = "main";

/// Segment the extractor is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentState {
    /// Before any segment directive.
    Outside,
    /// After `.data`.
    Data,
    /// After `.text`.
    Text,
}

/// A label referenced by an operand, checked at link time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelReference {
    /// Referenced name.
    pub name: String,
    /// Where the reference appears.
    pub span: Span,
}

/// Unlinked output of the extractor.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Text-segment statements in order.
    pub statements: Vec<Statement>,
    /// Data-segment variables in order.
    pub variables: Vec<Variable>,
    /// Instruction labels to statement index.
    pub text_labels: HashMap<Label, usize>,
    /// Variable labels to variable index.
    pub data_labels: HashMap<Label, usize>,
    /// Every label referenced by an operand or `.globl`.
    pub references: Vec<LabelReference>,
}

/// Single-pass syntax-tree walker.
#[derive(Debug)]
pub struct ProgramExtractor<'a> {
    operands: OperandExtractor<'a>,
    permissive: bool,
    state: SegmentState,
    outstanding: Vec<(String, Span)>,
    out: Extraction,
    problems: Vec<Problem>,
}

impl<'a> ProgramExtractor<'a> {
    /// Creates an extractor.
    ///
    /// # Arguments
    ///
    /// * `registers` - Register name table used to resolve register operands.
    /// * `permissive` - Accept 32-bit integers in immediate slots.
    pub fn new(registers: &'a RegisterTable, permissive: bool) -> Self {
        Self {
            operands: OperandExtractor::new(registers),
            permissive,
            state: SegmentState::Outside,
            outstanding: Vec::new(),
            out: Extraction {
                statements: Vec::new(),
                variables: Vec::new(),
                text_labels: HashMap::new(),
                data_labels: HashMap::new(),
                references: Vec::new(),
            },
            problems: Vec::new(),
        }
    }

    /// Current segment state.
    pub const fn state(&self) -> SegmentState {
        self.state
    }

    /// Walks the whole tree and returns the extraction plus every problem found.
    pub fn extract(mut self, tree: &SyntaxTree) -> (Extraction, Vec<Problem>) {
        for node in &tree.nodes {
            self.visit(node);
        }
        self.finish();
        debug!(
            statements = self.out.statements.len(),
            variables = self.out.variables.len(),
            problems = self.problems.len(),
            "extraction finished"
        );
        (self.out, self.problems)
    }

    /// Processes one node.
    pub fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Segment(SegmentKind::Text) => self.state = SegmentState::Text,
            NodeKind::Segment(SegmentKind::Data) => self.state = SegmentState::Data,
            NodeKind::Label(name) => self.declare_label(name, node.span),
            NodeKind::Directive { name, operands } => {
                self.directive(name, operands, node.span);
            }
            NodeKind::Statement { mnemonic, operands } => {
                self.statement(mnemonic, operands, node.span);
            }
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.out.text_labels.contains_key(name)
            || self.out.data_labels.contains_key(name)
            || self.outstanding.iter().any(|(n, _)| n == name)
    }

    fn declare_label(&mut self, name: &str, span: Span) {
        if self.is_declared(name) {
            self.problems
                .push(Problem::at(format!("label '{name}' is already declared"), span));
            return;
        }
        if name == ENTRY_LABEL && self.state != SegmentState::Text {
            self.problems.push(Problem::at(
                format!("label '{ENTRY_LABEL}' must be declared in the .text segment"),
                span,
            ));
            return;
        }
        self.outstanding.push((name.to_string(), span));
    }

    fn attach_labels(&mut self, kind: LabelKind, index: usize) {
        let map = match kind {
            LabelKind::Instruction => &mut self.out.text_labels,
            LabelKind::Variable => &mut self.out.data_labels,
        };
        for (name, span) in self.outstanding.drain(..) {
            let label = Label {
                name,
                line: span.line,
                kind,
            };
            let _ = map.insert(label, index);
        }
    }

    fn push_statement(&mut self, statement: Statement) {
        let index = self.out.statements.len();
        self.out.statements.push(statement);
        self.attach_labels(LabelKind::Instruction, index);
    }

    fn push_variable(&mut self, variable: Variable) {
        let index = self.out.variables.len();
        self.out.variables.push(variable);
        self.attach_labels(LabelKind::Variable, index);
    }

    fn record_references(&mut self, operands: &[Operand], span: Span) {
        for name in operands.iter().filter_map(Operand::label) {
            self.out.references.push(LabelReference {
                name: name.to_string(),
                span,
            });
        }
    }

    fn statement(&mut self, mnemonic: &str, nodes: &[OperandNode], span: Span) {
        if self.state != SegmentState::Text {
            self.problems.push(Problem::at(
                format!("instruction '{mnemonic}' outside the .text segment"),
                span,
            ));
        }
        let operands = self.operands.extract_all(nodes, &mut self.problems);
        let Some(instruction) = Instruction::from_mnemonic(mnemonic) else {
            self.problems
                .push(Problem::at(format!("unknown instruction '{mnemonic}'"), span));
            self.push_statement(Statement::new(Instruction::Nop, Vec::new(), span.line));
            return;
        };
        if let Err(mismatch) = instruction.format().validate(&operands, self.permissive) {
            self.problems
                .push(Problem::at(format!("{instruction}: {mismatch}"), span));
        }
        self.record_references(&operands, span);
        self.push_statement(Statement::new(instruction, operands, span.line));
    }

    fn require_data(&mut self, name: &str, span: Span) -> bool {
        if self.state == SegmentState::Data {
            return true;
        }
        self.problems.push(Problem::at(
            format!("directive '.{name}' is only allowed in the .data segment"),
            span,
        ));
        false
    }

    fn single<'o>(
        &mut self,
        name: &str,
        operands: &'o [Operand],
        span: Span,
    ) -> Option<&'o Operand> {
        if let [operand] = operands {
            Some(operand)
        } else {
            self.problems.push(Problem::at(
                format!(
                    "directive '.{name}' expects exactly 1 operand, found {}",
                    operands.len()
                ),
                span,
            ));
            None
        }
    }

    fn directive(&mut self, name: &str, nodes: &[OperandNode], span: Span) {
        let operands = self.operands.extract_all(nodes, &mut self.problems);
        match name {
            "text" | "data" => {
                self.problems.push(Problem::at(
                    format!("segment directive '.{name}' takes no operands"),
                    span,
                ));
            }
            "globl" | "global" => {
                if operands.is_empty() {
                    self.problems
                        .push(Problem::at("directive '.globl' expects a label", span));
                }
                for operand in &operands {
                    if operand.operand_type() != OperandType::Label {
                        self.problems.push(Problem::at(
                            format!("directive '.globl' expects labels, found {operand}"),
                            span,
                        ));
                    }
                }
                self.record_references(&operands, span);
            }
            "align" => {
                if !self.require_data(name, span) {
                    return;
                }
                match self.single(name, &operands, span) {
                    Some(Operand::Integer(0..=3)) | None => {}
                    Some(operand) => self.problems.push(Problem::at(
                        format!("directive '.align' expects 0, 1, 2 or 3, found {operand}"),
                        span,
                    )),
                }
            }
            "ascii" | "asciiz" => {
                if !self.require_data(name, span) {
                    return;
                }
                let Some(operand) = self.single(name, &operands, span) else {
                    return;
                };
                let Operand::String(text) = operand else {
                    self.problems.push(Problem::at(
                        format!("directive '.{name}' expects a string, found {operand}"),
                        span,
                    ));
                    return;
                };
                let (data_type, extra) = if name == "asciiz" {
                    (DataType::Asciiz, 1)
                } else {
                    (DataType::Ascii, 0)
                };
                let size = u32::try_from(text.len()).unwrap_or(u32::MAX).saturating_add(extra);
                self.push_variable(Variable {
                    data_type,
                    size,
                    value: Some(operand.clone()),
                    line: span.line,
                });
            }
            "byte" | "half" | "word" => {
                if !self.require_data(name, span) {
                    return;
                }
                let data_type = match name {
                    "byte" => DataType::Byte,
                    "half" => DataType::Half,
                    _ => DataType::Word,
                };
                if operands.is_empty() {
                    self.problems.push(Problem::at(
                        format!("directive '.{name}' expects at least one integer"),
                        span,
                    ));
                }
                for operand in operands {
                    if !matches!(operand, Operand::Integer(_)) {
                        self.problems.push(Problem::at(
                            format!("directive '.{name}' expects integers, found {operand}"),
                            span,
                        ));
                        continue;
                    }
                    self.push_variable(Variable {
                        data_type,
                        size: data_type.scalar_size().unwrap_or(0),
                        value: Some(operand),
                        line: span.line,
                    });
                }
            }
            "space" => {
                if !self.require_data(name, span) {
                    return;
                }
                match self.single(name, &operands, span) {
                    Some(&Operand::Integer(size)) if size >= 0 => {
                        self.push_variable(Variable {
                            data_type: DataType::Space,
                            size: size.unsigned_abs(),
                            value: None,
                            line: span.line,
                        });
                    }
                    Some(operand) => self.problems.push(Problem::at(
                        format!("directive '.space' expects a non-negative size, found {operand}"),
                        span,
                    )),
                    None => {}
                }
            }
            _ => self
                .problems
                .push(Problem::at(format!("unknown directive '.{name}'"), span)),
        }
    }

    fn finish(&mut self) {
        let main_pending = self.outstanding.iter().any(|(n, _)| n == ENTRY_LABEL);
        if !main_pending && !self.out.text_labels.contains_key(ENTRY_LABEL) {
            self.problems.push(Problem::new(format!(
                "no '{ENTRY_LABEL}' label declared in the .text segment"
            )));
        }
        if let Some((_, first)) = self.outstanding.first() {
            let names: Vec<&str> = self.outstanding.iter().map(|(n, _)| n.as_str()).collect();
            self.problems.push(Problem::at(
                format!(
                    "labels not attached to any statement or variable: {}",
                    names.join(", ")
                ),
                *first,
            ));
        }
    }
}
