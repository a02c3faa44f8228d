//! Assembler.
//!
//! Turns assembly source into a linked `Program`. The pipeline is:
//! 1. **Parsing:** `parser` lowers source text into a flat `SyntaxTree`.
//! 2. **Extraction:** `extractor` validates the tree and builds unlinked statements,
//!    variables and label tables, accumulating every problem in one pass.
//! 3. **Linking:** `linker` assigns absolute addresses and checks label references.
//!
//! Assembly succeeds iff no problem was recorded.

/// Program extractor (segment state machine and validation).
pub mod extractor;

/// Address assignment and label resolution.
pub mod linker;

/// Operand extractor.
pub mod operand;

/// Reference `pest` front end.
pub mod parser;

/// Assembly-time problems.
pub mod problem;

/// Syntax tree consumed by the extractor.
pub mod syntax;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;
use tracing::{debug, info};

use crate::common::addr::Address;
use crate::config::Config;
use crate::isa::abi::RegisterTable;
use crate::isa::program::Program;

pub use self::problem::Problem;
pub use self::syntax::SyntaxTree;

use self::extractor::ProgramExtractor;
use self::linker::Linker;

/// Hashes source text for change detection.
pub fn hash_source(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// Failure of the one-shot `assemble_source` entry point.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// The source did not parse.
    #[error("{0}")]
    Parse(Problem),
    /// Extraction or linking recorded problems.
    #[error("assembly failed with {} problem(s)", .0.len())]
    Problems(Vec<Problem>),
}

impl AssembleError {
    /// Every problem carried by the error.
    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::Parse(problem) => std::slice::from_ref(problem),
            Self::Problems(problems) => problems,
        }
    }
}

/// Options controlling assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Accept 32-bit integers in immediate slots.
    pub permissive: bool,
    /// First text-segment address.
    pub text_base: Address,
    /// First data-segment address.
    pub data_base: Address,
    /// First address past the static data segment (the heap base).
    pub data_limit: Address,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AssemblerOptions {
    fn from(config: &Config) -> Self {
        Self {
            permissive: config.assembler.permissive,
            text_base: Address::new(config.memory.text_base),
            data_base: Address::new(config.memory.data_base),
            data_limit: Address::new(config.memory.heap_base),
        }
    }
}

/// Assembler driver: extraction followed by linking.
#[derive(Debug, Default)]
pub struct Assembler {
    options: AssemblerOptions,
    registers: RegisterTable,
    problems: Vec<Problem>,
}

impl Assembler {
    /// Creates an assembler with the standard register table.
    pub fn new(options: AssemblerOptions) -> Self {
        Self::with_registers(options, RegisterTable::default())
    }

    /// Creates an assembler resolving registers through a custom table.
    pub const fn with_registers(options: AssemblerOptions, registers: RegisterTable) -> Self {
        Self {
            options,
            registers,
            problems: Vec::new(),
        }
    }

    /// Problems recorded by the last call to `assemble`.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Assembles a syntax tree.
    ///
    /// # Returns
    ///
    /// The linked program if no problem was found; otherwise `None`, with the problems
    /// available through `problems()`.
    pub fn assemble(&mut self, tree: &SyntaxTree) -> Option<Program> {
        let extractor = ProgramExtractor::new(&self.registers, self.options.permissive);
        let (extraction, problems) = extractor.extract(tree);
        self.problems = problems;

        let linker = Linker::new(self.options.text_base, self.options.data_base)
            .with_data_limit(self.options.data_limit);
        let program = linker.link(extraction, tree.source_hash, &mut self.problems);
        match &program {
            Some(p) => info!(
                statements = p.statements().len(),
                variables = p.variables().len(),
                "assembled program"
            ),
            None => debug!(problems = self.problems.len(), "assembly failed"),
        }
        program
    }
}

/// Parses and assembles source text in one step.
///
/// # Errors
///
/// `AssembleError::Parse` if the source does not parse, `AssembleError::Problems` if
/// extraction or linking found problems.
pub fn assemble_source(source: &str, options: AssemblerOptions) -> Result<Program, AssembleError> {
    let tree = parser::parse(source).map_err(AssembleError::Parse)?;
    let mut assembler = Assembler::new(options);
    assembler
        .assemble(&tree)
        .ok_or_else(|| AssembleError::Problems(assembler.problems().to_vec()))
}
