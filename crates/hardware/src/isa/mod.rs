//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the MIPS-subset opcode table, the operand model and operand-format
//! contracts, the linked program image and the decoder that turns statements into
//! internal execution formats.

/// Register name mappings and calling-convention registers.
pub mod abi;

/// Conversion of statements into internal execution formats.
pub mod decode;

/// Statement disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Operand types and per-opcode operand-format contracts.
pub mod format;

/// The opcode set.
pub mod instruction;

/// Typed operand values.
pub mod operand;

/// Linked program image.
pub mod program;
