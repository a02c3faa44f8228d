//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which owns the entire simulated
//! machine state for one run. It coordinates the following:
//! 1. **State Management:** Register file (GPRs, `pc`, `hi`, `lo`) and region memory.
//! 2. **Execution Models:** Single-cycle stepping or the three-slot pipeline.
//! 3. **Observability:** Every stage publishes messages on the shared bus.
//! 4. **System Integration:** Syscalls delegate I/O to the `Io` collaborator.

/// Fetch, decode and execute for both execution models.
pub mod execution;

/// Load/store helpers that publish data movements.
pub mod memory;

/// Syscall dispatch table.
pub mod syscall;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::bus::MessageBus;
use crate::common::{Address, Register, RegisterFile, SimError, Word};
use crate::config::Config;
use crate::core::memory::Memory;
use crate::core::pipeline::Pipeline;
use crate::isa::program::Program;
use crate::sim::io::Io;
use crate::stats::SimStats;

/// Label execution starts at.
pub const ENTRY_POINT: &str = "main";

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExitStatus {
    /// The program called an exit syscall with this code.
    Exited(i32),
    /// Execution ran off the end of the text segment.
    Finished,
    /// A blocking read was cancelled.
    Cancelled,
    /// The controller stopped the run.
    Stopped,
}

impl ExitStatus {
    /// Process exit code corresponding to this status.
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Finished | Self::Cancelled | Self::Stopped => 0,
        }
    }
}

/// Main CPU structure containing all machine state for one run.
pub struct Cpu {
    /// General-purpose registers, `pc`, `hi` and `lo`.
    pub regs: RegisterFile,
    /// Data memory (static data, heap, stack).
    pub memory: Memory,
    /// Pipeline slots; unused in single-cycle mode.
    pub pipeline: Pipeline,
    /// Run statistics.
    pub stats: SimStats,
    /// Pipelined (`true`) or single-cycle execution.
    pub pipelined: bool,
    /// Log every executed instruction at debug level.
    pub trace: bool,
    program: Program,
    bus: Arc<MessageBus>,
    io: Arc<dyn Io>,
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("pc", &self.regs.pc)
            .field("pipelined", &self.pipelined)
            .field("cycles", &self.stats.cycles)
            .finish_non_exhaustive()
    }
}

impl Cpu {
    /// Creates a CPU ready to execute `program` from its `main` label.
    ///
    /// # Arguments
    ///
    /// * `program` - The linked program.
    /// * `config` - Memory layout and execution model.
    /// * `bus` - Bus every stage publishes on.
    /// * `io` - Collaborator used by syscalls.
    ///
    /// # Errors
    ///
    /// `SimError::Program` if the program has no `main` label.
    pub fn new(
        program: Program,
        config: &Config,
        bus: Arc<MessageBus>,
        io: Arc<dyn Io>,
    ) -> Result<Self, SimError> {
        let entry = program
            .label_address(ENTRY_POINT)
            .ok_or_else(|| SimError::Program {
                address: None,
                message: format!("no '{ENTRY_POINT}' label to start from"),
            })?;

        let memory = Memory::new(&config.memory, program.text_end(), &program.data_image());
        let mut regs = RegisterFile::new();
        let _ = regs.write(
            Register::SP,
            Word::from_unsigned(config.memory.stack_pointer),
        );
        let _ = regs.write(
            Register::GP,
            Word::from_unsigned(config.memory.global_pointer),
        );
        regs.pc = entry;

        Ok(Self {
            regs,
            memory,
            pipeline: Pipeline::default(),
            stats: SimStats::default(),
            pipelined: config.cpu.pipelined,
            trace: config.general.trace,
            program,
            bus,
            io,
        })
    }

    /// The program being executed.
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// The bus this CPU publishes on.
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// The I/O collaborator.
    pub fn io(&self) -> &Arc<dyn Io> {
        &self.io
    }

    /// Address of the next instruction to fetch.
    pub const fn pc(&self) -> Address {
        self.regs.pc
    }

    /// Dumps the current CPU state (PC and registers) to stdout.
    pub fn dump_state(&self) {
        self.regs.dump();
    }
}
