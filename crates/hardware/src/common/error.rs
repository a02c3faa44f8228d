//! Runtime exception definitions.
//!
//! This module defines the exceptions raised by the execution engine. They are raised
//! eagerly and are always fatal to the current run. It provides:
//! 1. **Exception Taxonomy:** Decode, execute, memory, heap, stack, instruction and program errors.
//! 2. **Location:** Each variant carries the address that triggered it where one exists.
//! 3. **Error Handling:** Integrates with standard Rust error traits through `thiserror`.

use thiserror::Error;

use super::addr::Address;

/// A runtime exception raised while executing a program.
///
/// The top-level run loop converts any of these into a problem message on the error
/// stream and stops the simulated run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// A statement could not be converted into its internal execution format.
    #[error("decode error at {address}: {message}")]
    Decode {
        /// Address of the statement being decoded.
        address: Address,
        /// Description of the failure.
        message: String,
    },

    /// An instruction failed while executing (e.g. arithmetic overflow).
    #[error("execute error at {address}: {message}")]
    Execute {
        /// Address of the failing instruction.
        address: Address,
        /// Description of the failure.
        message: String,
    },

    /// A memory access was out of range, misaligned, or hit a read-only region.
    #[error("memory error at {address}: {message}")]
    Memory {
        /// The offending data address.
        address: Address,
        /// Description of the failure.
        message: String,
    },

    /// A heap allocation request could not be satisfied.
    #[error("heap error: {message} (requested {requested} bytes)")]
    Heap {
        /// Number of bytes requested (may be negative for a shrink request).
        requested: i32,
        /// Description of the failure.
        message: String,
    },

    /// An access fell just below the stack limit.
    #[error("stack overflow at {address}")]
    Stack {
        /// The offending data address.
        address: Address,
    },

    /// The instruction itself is invalid in context (break, unknown syscall).
    #[error("instruction error at {address}: {message}")]
    Instruction {
        /// Address of the instruction.
        address: Address,
        /// Description of the failure.
        message: String,
    },

    /// The program as a whole is in an invalid state (e.g. PC left the text segment, or a
    /// read syscall got unusable input).
    #[error("program error{}: {message}", .address.map(|a| format!(" at {a}")).unwrap_or_default())]
    Program {
        /// The instruction or PC that triggered it, when there is one.
        address: Option<Address>,
        /// Description of the failure.
        message: String,
    },
}

impl SimError {
    /// Returns the address associated with the exception, if any.
    pub const fn address(&self) -> Option<Address> {
        match self {
            Self::Decode { address, .. }
            | Self::Execute { address, .. }
            | Self::Memory { address, .. }
            | Self::Stack { address }
            | Self::Instruction { address, .. } => Some(*address),
            Self::Program { address, .. } => *address,
            Self::Heap { .. } => None,
        }
    }

    /// Short category name, used in problem messages and traces.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "DecodeError",
            Self::Execute { .. } => "ExecuteError",
            Self::Memory { .. } => "MemoryError",
            Self::Heap { .. } => "HeapError",
            Self::Stack { .. } => "StackError",
            Self::Instruction { .. } => "InstructionError",
            Self::Program { .. } => "ProgramError",
        }
    }
}
